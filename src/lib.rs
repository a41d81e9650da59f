
pub mod constants;
pub mod config;
pub mod geodesy;
pub mod fingerprint;
pub mod store;
pub mod matcher;
pub mod scorer;
pub mod selector;
pub mod estimator;
pub mod fix;
