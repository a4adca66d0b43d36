pub mod args;
pub mod plural;
pub mod stack;
pub mod translator;

pub use args::{arg, Args};
pub use stack::TranslatorStack;
pub use translator::Translator;
