//! Settings are read from a TOML file, then `WORKCLOCK__<SECTION>__<KEY>`
//! environment variables. `JWT_SECRET` overrides `auth.secret`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
