pub mod allocation;
pub mod auth_service;
pub mod insight;
pub mod normalize;
pub mod risk;
