mod assistant;
mod case_session;
mod chunked_translator;
mod citations;
mod history;
mod history_files;
#[cfg(test)]
pub mod test_doubles;

pub use assistant::*;
pub use case_session::*;
pub use chunked_translator::*;
pub use citations::*;
pub use history::*;
pub use history_files::*;
