// handlers/mod.rs - Two-tier handler layout
//
// Public (no identity required) → Protected (bearer identity required).
// Which tier a route belongs to is decided by middleware::policy, not by
// where the handler lives; the split here mirrors that classification.
pub mod protected; // /usuarios/me, /topicos/*, /stats
pub mod public; // POST /auth, POST /usuarios
pub mod validate;
