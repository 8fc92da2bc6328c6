pub mod server;

use crate::portiere::config::Config;

#[derive(Debug)]
pub enum Action {
    Server { port: u16, config: Config },
}
