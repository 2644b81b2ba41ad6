pub mod health;
pub mod memberships;
