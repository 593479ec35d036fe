//! End-to-end tests for the conflict checker and the referential
//! delete rules, run against an in-memory store.

use chrono::NaiveTime;

use timetable::auth::hash_credential;
use timetable::db::TimetableStore;
use timetable::error::TimetableError;
use timetable::models::{
    NewAccount, NewClassroom, NewCourse, NewDepartment, NewScheduleEntry, Role, RoomType, Weekday,
};
use timetable::scheduler::overlaps;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

struct Fixture {
    store: TimetableStore,
    admin_id: i64,
    instructor1_id: i64,
    instructor2_id: i64,
    course1_id: i64,
    course2_id: i64,
    course3_id: i64,
    course4_id: i64,
    room1_id: i64,
    room2_id: i64,
}

/// Department CS; instructors I1 and I2; C1 and C2 taught by I1, C3 by
/// I2, C4 with no instructor; classrooms R1 and R2.
fn fixture() -> Fixture {
    let store = TimetableStore::open_in_memory().unwrap();

    let dept = store
        .create_department(&NewDepartment {
            code: "CS".to_string(),
            name: "Computer Science".to_string(),
        })
        .unwrap();

    let admin = store
        .create_account(
            &NewAccount {
                username: "admin".to_string(),
                credential: "admin123".to_string(),
                role: Role::Admin,
                display_name: "Administrator".to_string(),
                department_id: None,
            },
            &hash_credential("admin123"),
        )
        .unwrap();

    let mut instructors = Vec::new();
    for (username, name) in [("i1", "First Instructor"), ("i2", "Second Instructor")] {
        let account = store
            .create_account(
                &NewAccount {
                    username: username.to_string(),
                    credential: "pw".to_string(),
                    role: Role::Instructor,
                    display_name: name.to_string(),
                    department_id: Some(dept.department_id),
                },
                &hash_credential("pw"),
            )
            .unwrap();
        instructors.push(account.account_id);
    }

    let mut courses = Vec::new();
    for (code, instructor) in [
        ("C1", Some(instructors[0])),
        ("C2", Some(instructors[0])),
        ("C3", Some(instructors[1])),
        ("C4", None),
    ] {
        let course = store
            .create_course(&NewCourse {
                code: code.to_string(),
                name: format!("Course {code}"),
                department_id: dept.department_id,
                instructor_id: instructor,
                semester: 1,
                theory_hours: 3,
                practice_hours: 0,
                credits: 5,
                is_elective: false,
            })
            .unwrap();
        courses.push(course.course_id);
    }

    let mut rooms = Vec::new();
    for code in ["R1", "R2"] {
        let room = store
            .create_classroom(&NewClassroom {
                code: code.to_string(),
                capacity: 40,
                room_type: RoomType::Lecture,
            })
            .unwrap();
        rooms.push(room.classroom_id);
    }

    Fixture {
        store,
        admin_id: admin.account_id,
        instructor1_id: instructors[0],
        instructor2_id: instructors[1],
        course1_id: courses[0],
        course2_id: courses[1],
        course3_id: courses[2],
        course4_id: courses[3],
        room1_id: rooms[0],
        room2_id: rooms[1],
    }
}

fn entry(
    course_id: i64,
    classroom_id: i64,
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
) -> NewScheduleEntry {
    NewScheduleEntry {
        course_id,
        classroom_id,
        day,
        start,
        end,
    }
}

#[test]
fn scenario_instructor_then_classroom_then_boundary() {
    let f = fixture();

    // C1 (I1) Monday 09:00-10:00 in R1
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();

    // C2 shares I1 -> instructor conflict, even in a different room
    let err = f
        .store
        .validate_and_insert(&entry(
            f.course2_id,
            f.room2_id,
            Weekday::Monday,
            t(9, 30),
            t(10, 30),
        ))
        .unwrap_err();
    match err {
        TimetableError::InstructorConflict { conflicts, .. } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].course_code, "C1");
            assert_eq!(conflicts[0].classroom_code, "R1");
            assert_eq!(conflicts[0].start, t(9, 0));
            assert_eq!(conflicts[0].end, t(10, 0));
        }
        other => panic!("expected InstructorConflict, got {other:?}"),
    }

    // C3 has a different instructor but wants the occupied R1
    let err = f
        .store
        .validate_and_insert(&entry(
            f.course3_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 30),
            t(10, 30),
        ))
        .unwrap_err();
    match err {
        TimetableError::ClassroomConflict {
            classroom,
            conflicts,
        } => {
            assert_eq!(classroom, "R1");
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].course_code, "C1");
        }
        other => panic!("expected ClassroomConflict, got {other:?}"),
    }

    // C4 starts exactly when C1 ends: boundary touch is allowed
    f.store
        .validate_and_insert(&entry(
            f.course4_id,
            f.room1_id,
            Weekday::Monday,
            t(10, 0),
            t(11, 0),
        ))
        .unwrap();

    // Only the two accepted entries were written
    assert_eq!(f.store.entries_for_day(Weekday::Monday).unwrap().len(), 2);
}

#[test]
fn boundary_touch_accepted_in_both_directions() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Tuesday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();

    // Ends exactly at the existing start
    f.store
        .validate_and_insert(&entry(
            f.course4_id,
            f.room1_id,
            Weekday::Tuesday,
            t(8, 0),
            t(9, 0),
        ))
        .unwrap();
    // Starts exactly at the existing end
    f.store
        .validate_and_insert(&entry(
            f.course3_id,
            f.room1_id,
            Weekday::Tuesday,
            t(10, 0),
            t(11, 0),
        ))
        .unwrap();
}

#[test]
fn instructor_scan_runs_before_classroom_scan() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();

    // C2 conflicts on both instructor and classroom; the instructor
    // conflict is reported
    let err = f
        .store
        .validate_and_insert(&entry(
            f.course2_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap_err();
    assert!(matches!(err, TimetableError::InstructorConflict { .. }));
}

#[test]
fn same_slot_on_other_day_is_free() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();
    f.store
        .validate_and_insert(&entry(
            f.course2_id,
            f.room1_id,
            Weekday::Wednesday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();
}

#[test]
fn inverted_or_empty_range_rejected() {
    let f = fixture();
    for (start, end) in [(t(10, 0), t(9, 0)), (t(9, 0), t(9, 0))] {
        let err = f
            .store
            .validate_and_insert(&entry(
                f.course1_id,
                f.room1_id,
                Weekday::Monday,
                start,
                end,
            ))
            .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidTimeRange { .. }));
    }
    assert!(f.store.entries_for_day(Weekday::Monday).unwrap().is_empty());
}

#[test]
fn nothing_written_on_conflict() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Friday,
            t(9, 0),
            t(11, 0),
        ))
        .unwrap();
    let before = f.store.list_entries().unwrap().len();

    let _ = f
        .store
        .validate_and_insert(&entry(
            f.course3_id,
            f.room1_id,
            Weekday::Friday,
            t(10, 0),
            t(12, 0),
        ))
        .unwrap_err();

    assert_eq!(f.store.list_entries().unwrap().len(), before);
}

#[test]
fn stored_entries_never_overlap() {
    let f = fixture();
    let attempts = [
        (f.course1_id, f.room1_id, t(9, 0), t(10, 0)),
        (f.course2_id, f.room2_id, t(9, 30), t(10, 30)), // I1 busy
        (f.course3_id, f.room1_id, t(9, 30), t(10, 30)), // R1 busy
        (f.course3_id, f.room2_id, t(10, 0), t(11, 0)),
        (f.course4_id, f.room1_id, t(10, 0), t(11, 0)),
        (f.course2_id, f.room2_id, t(11, 0), t(12, 0)),
        (f.course4_id, f.room2_id, t(11, 30), t(12, 30)), // R2 busy
    ];
    for (course_id, classroom_id, start, end) in attempts {
        let _ = f
            .store
            .validate_and_insert(&entry(course_id, classroom_id, Weekday::Monday, start, end));
    }

    let entries = f.store.entries_for_day(Weekday::Monday).unwrap();
    for a in &entries {
        for b in &entries {
            if a.entry_id == b.entry_id {
                continue;
            }
            if a.classroom_id == b.classroom_id {
                assert!(
                    !overlaps(a.start, a.end, b.start, b.end),
                    "classroom double booking: {a:?} vs {b:?}",
                );
            }
            let ia = f.store.get_course(a.course_id).unwrap().instructor_id;
            let ib = f.store.get_course(b.course_id).unwrap().instructor_id;
            if ia.is_some() && ia == ib {
                assert!(
                    !overlaps(a.start, a.end, b.start, b.end),
                    "instructor double booking: {a:?} vs {b:?}",
                );
            }
        }
    }
}

#[test]
fn referential_blocks_leave_store_unchanged() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();

    // Department has courses and accounts
    let err = f.store.delete_department(1).unwrap_err();
    assert!(matches!(err, TimetableError::ReferentialBlock { .. }));
    assert_eq!(f.store.list_departments().unwrap().len(), 1);

    // Course and classroom are referenced by the schedule entry
    let err = f.store.delete_course(f.course1_id).unwrap_err();
    assert!(matches!(err, TimetableError::ReferentialBlock { .. }));
    let err = f.store.delete_classroom(f.room1_id).unwrap_err();
    assert!(matches!(err, TimetableError::ReferentialBlock { .. }));
    assert_eq!(f.store.list_courses().unwrap().len(), 4);
    assert_eq!(f.store.list_classrooms().unwrap().len(), 2);

    // Removing the entry unblocks both deletes
    let entry_id = f.store.entries_for_day(Weekday::Monday).unwrap()[0].entry_id;
    f.store.delete_entry(entry_id).unwrap();
    f.store.delete_course(f.course1_id).unwrap();
    f.store.delete_classroom(f.room1_id).unwrap();
}

#[test]
fn duplicate_codes_rejected() {
    let f = fixture();
    let err = f
        .store
        .create_department(&NewDepartment {
            code: "CS".to_string(),
            name: "Duplicate".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, TimetableError::DuplicateCode { .. }));

    let err = f
        .store
        .create_classroom(&NewClassroom {
            code: "R1".to_string(),
            capacity: 10,
            room_type: RoomType::Lab,
        })
        .unwrap_err();
    assert!(matches!(err, TimetableError::DuplicateCode { .. }));

    let err = f
        .store
        .create_account(
            &NewAccount {
                username: "admin".to_string(),
                credential: "x".to_string(),
                role: Role::Student,
                display_name: "Impostor".to_string(),
                department_id: None,
            },
            &hash_credential("x"),
        )
        .unwrap_err();
    assert!(matches!(err, TimetableError::DuplicateCode { .. }));
}

#[test]
fn admin_protection_rules() {
    let f = fixture();

    // The acting admin cannot delete itself
    let err = f
        .store
        .delete_account(f.admin_id, f.admin_id)
        .unwrap_err();
    assert!(matches!(err, TimetableError::SelfDeletionBlocked { .. }));

    // Nobody may remove the sole remaining admin
    let err = f
        .store
        .delete_account(f.admin_id, f.instructor1_id)
        .unwrap_err();
    assert!(matches!(err, TimetableError::LastAdminProtection { .. }));

    // With a second admin present the first becomes deletable
    let second = f
        .store
        .create_account(
            &NewAccount {
                username: "admin2".to_string(),
                credential: "pw2".to_string(),
                role: Role::Admin,
                display_name: "Second Admin".to_string(),
                department_id: None,
            },
            &hash_credential("pw2"),
        )
        .unwrap();
    f.store
        .delete_account(f.admin_id, second.account_id)
        .unwrap();
    assert_eq!(f.store.admin_count().unwrap(), 1);
}

#[test]
fn report_rows_join_all_records() {
    let f = fixture();
    f.store
        .validate_and_insert(&entry(
            f.course1_id,
            f.room1_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();
    f.store
        .validate_and_insert(&entry(
            f.course4_id,
            f.room2_id,
            Weekday::Monday,
            t(9, 0),
            t(10, 0),
        ))
        .unwrap();

    let rows = f.store.schedule_rows().unwrap();
    assert_eq!(rows.len(), 2);

    let c1 = rows.iter().find(|r| r.course_code == "C1").unwrap();
    assert_eq!(c1.department_code, "CS");
    assert_eq!(c1.classroom_code, "R1");
    assert_eq!(c1.instructor_name.as_deref(), Some("First Instructor"));
    assert_eq!(c1.semester, 1);

    // C4 has no instructor; the left join keeps the row
    let c4 = rows.iter().find(|r| r.course_code == "C4").unwrap();
    assert!(c4.instructor_name.is_none());
}

#[test]
fn instructor_with_courses_cannot_be_deleted() {
    let f = fixture();
    let err = f
        .store
        .delete_account(f.instructor2_id, f.admin_id)
        .unwrap_err();
    assert!(matches!(err, TimetableError::ReferentialBlock { .. }));
}
