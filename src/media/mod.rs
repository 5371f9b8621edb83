mod classify;
mod command;
mod errors;
mod formats;
mod metadata;
mod runner;
pub mod tools;
mod types;

pub use classify::{classify, dispatch_family, is_supported};
pub use command::{build, build_silent, ToolCommand};
pub use errors::{MetadataFailure, ValidationFailure};
pub use formats::{describe, reduce};
pub use metadata::{fetch_descriptor, fetch_formats};
pub use runner::{SystemRunner, ToolRunner};
pub use types::{
    ActionChoice, ActionParams, ContentDescriptor, CookieBrowser, DownloadMode, LastAction,
    ProviderFamily, SeriesAction, Session, Shape, VideoAction,
};

#[cfg(test)]
pub use command::Tool;
#[cfg(test)]
pub use runner::fake::FakeRunner;
