pub(crate) mod hubspot;
