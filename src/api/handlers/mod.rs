pub mod authorization;
pub mod decision;
pub mod discovery;
pub mod health;
pub mod introspection;
pub mod revocation;
pub mod token;
