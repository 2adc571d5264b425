// churn-common: fixture templates and report types shared by the churn CLI

pub mod fixture;
pub mod stamp;
pub mod types;
