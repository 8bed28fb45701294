mod screens;
mod view;

pub use view::ExamView;
