mod backend;
mod command;
pub mod parse;

pub use backend::{P4Backend, NAME};
pub use command::{
    is_p4_command_available, p4_client_name, p4_command_path, p4_command_version, p4_root_dir,
    p4_user_name,
};
