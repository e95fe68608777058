pub mod attendance;
pub mod study;
pub mod subject;
pub mod timetable;

pub use attendance::{class_key, AttendanceRecord, AttendanceStatus, SubjectAttendance};
pub use study::{GoalProgress, StudyData, StudySession, WEEK_DAYS};
pub use subject::{Subject, SubjectId};
pub use timetable::{Day, Timetable};
