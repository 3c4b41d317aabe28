mod provisioning;

pub use provisioning::{CreateSuperAdminRequest, CreateSuperAdminResponse};
