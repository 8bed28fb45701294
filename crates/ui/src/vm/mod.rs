mod attempt_vm;
mod dashboard_vm;
mod exam_vm;
mod time_fmt;

pub use attempt_vm::{AttemptDetailVm, OutcomeRowVm, ReviewChoiceVm, map_attempt_detail};
pub use dashboard_vm::{
    AttemptRowVm, SubjectCardVm, SubjectPageVm, TestRowVm, map_subject_cards, map_test_row,
};
pub use exam_vm::{
    ChoiceVm, ExamPageVm, ExamScreen, ExhibitVm, IntroVm, QuestionVm, ResultsVm, ReviewRowVm, ReviewVm,
    TopicVm, band_class, exhibit_for, map_results, map_topics,
};
pub use time_fmt::{format_clock, format_datetime, format_duration};
