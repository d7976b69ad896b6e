//! Form bodies accepted by the HubSpot integration endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, WebErrorKind};

/// Identifies whose authorization is being started or read back.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserOrgParams {
    pub user_id: String,
    pub org_id: String,
}

impl UserOrgParams {
    /// Reject blank ids, which would otherwise share one store key.
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Web(WebErrorKind::Input("user_id")));
        }
        if self.org_id.trim().is_empty() {
            return Err(Error::Web(WebErrorKind::Input("org_id")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ItemsParams {
    /// The credentials JSON object returned by the credentials endpoint, as a string
    pub credentials: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_ids() {
        let params = UserOrgParams {
            user_id: " ".to_string(),
            org_id: "o1".to_string(),
        };
        assert!(matches!(
            params.validate(),
            Err(Error::Web(WebErrorKind::Input("user_id")))
        ));

        let params = UserOrgParams {
            user_id: "u1".to_string(),
            org_id: String::new(),
        };
        assert!(matches!(
            params.validate(),
            Err(Error::Web(WebErrorKind::Input("org_id")))
        ));
    }

    #[test]
    fn test_validate_accepts_ids() {
        let params = UserOrgParams {
            user_id: "u1".to_string(),
            org_id: "o1".to_string(),
        };
        assert!(params.validate().is_ok());
    }
}
