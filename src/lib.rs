// Rampart - Request sanitization and CSRF mitigation for Rust
//
// This library bundles the session store, CSRF drivers and the security
// manager with its filter chains behind cargo features.

// Re-export member crates
#[cfg(feature = "session")]
pub use rampart_session;

#[cfg(feature = "csrf")]
pub use rampart_csrf;

#[cfg(feature = "security")]
pub use rampart_security;

#[cfg(feature = "session")]
pub use rampart_session::{MemorySessionStore, Session, SessionError, SessionStore, SharedSession};

#[cfg(feature = "csrf")]
pub use rampart_csrf::{CsrfConfig, CsrfDriver, CsrfError, CsrfManager, CsrfToken, TokenGenerator};

#[cfg(feature = "security")]
pub use rampart_security::{
    Filter, FilterKind, FilterSpec, SecurityConfig, SecurityError, SecurityManager, Value,
};

// Prelude for common imports
pub mod prelude {
    #[cfg(feature = "session")]
    pub use rampart_session::prelude::*;

    #[cfg(feature = "csrf")]
    pub use rampart_csrf::{CsrfConfig, CsrfDriver, CsrfError, CsrfManager, CsrfToken};

    #[cfg(feature = "security")]
    pub use rampart_security::prelude::*;
}
