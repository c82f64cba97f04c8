use std::collections::{HashMap, HashSet};

use exam_seating::config::{EngineConfig, PlacementStrategy};
use exam_seating::logging;
use exam_seating::parser::{
    read_halls, read_rosters, ClassRoster, ClassSubjects, Hall, Subject, Teacher,
};
use exam_seating::request::{DateMode, ExamScheduleRequest, ManualSlot, ScheduleOptions};
use exam_seating::schedule::{generate_arrangement, generate_exam_schedule, HallGrid, Shift};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn assert_grid_rules(grid: &HallGrid) {
    for row in &grid.desks {
        for (col, desk) in row.iter().enumerate() {
            let classes: Vec<&str> = desk
                .seats
                .iter()
                .flatten()
                .map(|c| c.class_name.as_str())
                .collect();
            let distinct: HashSet<&str> = classes.iter().copied().collect();
            assert_eq!(classes.len(), distinct.len(), "two candidates of one class share a desk");

            if let Some(next) = row.get(col + 1) {
                let left = desk.seats.last().and_then(|s| s.as_ref());
                let right = next.seats.first().and_then(|s| s.as_ref());
                if let (Some(l), Some(r)) = (left, right) {
                    assert_ne!(l.class_name, r.class_name, "touching seats share a class");
                }
            }
        }
    }
}

#[test]
fn csv_inputs_to_seating_plan() {
    logging::init_test();
    let classes = read_rosters(
        "name,start_id,end_id,excluded,late_entries\nCS,1,12,\"3,4\",90\nME,101,110,,\nEE,201,210,205,\n".as_bytes(),
    )
    .unwrap();
    let halls =
        read_halls("name,rows,columns,desk_capacity\nNorth,4,3,3\nSouth,4,3,3\n".as_bytes())
            .unwrap();

    for strategy in [PlacementStrategy::SeatScan, PlacementStrategy::ColumnScore] {
        let config = EngineConfig::default().with_strategy(strategy);
        let mut rng = StdRng::seed_from_u64(2024);
        let plan = generate_arrangement(&classes, &halls, &config, &mut rng)
            .unwrap_or_else(|e| panic!("{:?} failed: {}", strategy, e));

        assert_eq!(plan.summary.total_candidates, 11 + 10 + 9);
        assert_eq!(plan.summary.total_capacity, 72);

        let mut seen = HashSet::new();
        for hall in &plan.halls {
            assert_grid_rules(&hall.seating);
            for (_, c) in hall.seating.candidates() {
                assert!(seen.insert((c.class_name.clone(), c.roll_no)), "candidate seated twice");
            }
        }
        assert_eq!(seen.len(), 30);
        assert!(seen.contains(&("CS".to_string(), 90)));
        assert!(!seen.contains(&("CS".to_string(), 3)));
    }
}

fn roster(name: &str, start: i64, end: i64) -> ClassRoster {
    ClassRoster {
        name: name.into(),
        start_id: start,
        end_id: end,
        excluded: String::new(),
        late_entries: String::new(),
    }
}

fn subject(name: &str, difficulty: u32) -> Subject {
    Subject {
        name: name.into(),
        difficulty,
    }
}

fn teacher(name: &str, subject: &str) -> Teacher {
    Teacher {
        name: name.into(),
        subject: subject.into(),
    }
}

fn request() -> ExamScheduleRequest {
    ExamScheduleRequest {
        classes: vec![roster("CS", 1, 5), roster("ME", 101, 105), roster("EE", 201, 204)],
        halls: vec![
            Hall {
                name: "A".into(),
                rows: 10,
                columns: 1,
                desk_capacity: 1,
            },
            Hall {
                name: "B".into(),
                rows: 10,
                columns: 1,
                desk_capacity: 1,
            },
        ],
        teachers: vec![
            teacher("T1", "Math"),
            teacher("T2", "Physics"),
            teacher("T3", "Chemistry"),
            teacher("T4", "History"),
            teacher("T5", "Art"),
        ],
        class_subjects: vec![
            ClassSubjects {
                class_name: "CS".into(),
                subjects: vec![subject("Math", 5), subject("Art", 1)],
            },
            ClassSubjects {
                class_name: "ME".into(),
                subjects: vec![subject("Physics", 4), subject("Math", 3)],
            },
            ClassSubjects {
                class_name: "EE".into(),
                subjects: vec![subject("Chemistry", 2)],
            },
        ],
        options: ScheduleOptions {
            start_date: Some("2026-05-04".into()),
            end_date: Some("2026-05-10".into()),
            exams_per_day: 2,
            invigilators_per_hall: 2,
            ..ScheduleOptions::default()
        },
    }
}

#[test]
fn auto_schedule_keeps_classes_and_staff_apart() {
    logging::init_test();
    let mut rng = StdRng::seed_from_u64(77);
    let schedule = generate_exam_schedule(&request(), &EngineConfig::default(), &mut rng).unwrap();
    assert_eq!(schedule.summary.total_exams, 5);

    let mut by_slot: HashMap<(String, Shift), Vec<_>> = HashMap::new();
    for entry in &schedule.exam_schedule {
        assert!(entry.date.is_assigned());
        by_slot.entry((entry.date.to_string(), entry.shift)).or_default().push(entry);
    }

    for entries in by_slot.values() {
        let classes: HashSet<&str> = entries.iter().map(|e| e.class_name.as_str()).collect();
        assert_eq!(classes.len(), entries.len(), "class examined twice in one slot");

        let subjects: HashSet<&str> = entries.iter().map(|e| e.subject_name.as_str()).collect();
        let teachers = request().teachers;
        let mut staffed: HashMap<&str, &str> = HashMap::new();
        for entry in entries {
            for name in &entry.invigilators {
                let t = teachers.iter().find(|t| &t.name == name).unwrap();
                assert!(!subjects.contains(t.subject.as_str()), "{} invigilates own subject", name);
                if let Some(hall) = entry.hall_name.as_deref() {
                    let previous = staffed.insert(name.as_str(), hall);
                    assert!(previous.map_or(true, |h| h == hall), "{} in two halls", name);
                }
            }
        }

        let seated: usize = entries[0].seating_arrangement.iter().map(|h| h.occupied).sum();
        let expected: usize = entries
            .iter()
            .map(|e| match e.class_name.as_str() {
                "EE" => 4,
                _ => 5,
            })
            .sum();
        assert_eq!(seated, expected);
    }
}

#[test]
fn manual_schedule_round_trip_through_json() {
    let mut req = request();
    req.options.date_mode = DateMode::Manual;
    req.options.manual_dates.insert(
        "EE_Chemistry".into(),
        ManualSlot {
            date: Some("2026-05-06".into()),
            shift: None,
        },
    );
    let raw = serde_json::to_string(&req).unwrap();
    let parsed: ExamScheduleRequest = serde_json::from_str(&raw).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let schedule = generate_exam_schedule(&parsed, &EngineConfig::default(), &mut rng).unwrap();
    let json = serde_json::to_value(&schedule).unwrap();

    let entries = json["exam_schedule"].as_array().unwrap();
    assert_eq!(entries[0]["date"], "2026-05-06");
    assert_eq!(entries[0]["shift"], "Morning");
    assert_eq!(entries[0]["hall_name"], "A");
    assert!(entries[1..].iter().all(|e| e["date"] == "Not Assigned"));
    assert_eq!(json["summary"]["total_days"], 1);
}
