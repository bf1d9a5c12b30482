//! Data transfer objects for persistence.

mod config_root;
mod session;

pub use config_root::{CONFIG_ROOT_ENTITY, ConfigRootV1_0_0, create_config_root_migrator};
pub use session::{
    SESSION_ENTITY, SessionV1_0_0, SessionV1_1_0, SessionV1_2_0, create_session_migrator,
};
