#![forbid(unsafe_code)]
#![cfg(feature = "serde")]
use gardes::{
    io, month_days, AllocConfig, Allocator, Doctor, DoctorId, HolidayCalendar, JsonStorage,
    RequestKind, RequestSet, Roster, Storage, Team, YearMonth,
};
use std::fs;
use tempfile::tempdir;

fn small_run() -> (Vec<Doctor>, gardes::AllocationResult) {
    let config = AllocConfig::default();
    let allocator = Allocator::new(&config).unwrap();
    let doctors = vec![
        Doctor::new("a", "Alice", Team::Nes, 0.0),
        Doctor::new("b", "Bob", Team::Nes, 1.0),
        Doctor::new("c", "Carol", Team::Nes, 2.25),
    ];
    let days = month_days(YearMonth::new(2025, 7).unwrap(), &HolidayCalendar::new())[..2].to_vec();
    let result = allocator
        .allocate_days(&doctors, &RequestSet::new(), days)
        .unwrap();
    (doctors, result)
}

#[test]
fn renders_text_table() {
    let (doctors, result) = small_run();
    let table = io::render_allocation_table(&doctors, &result);
    insta::assert_snapshot!(table.trim_end(), @r"
    a Alice [NES] HO1 PC | 1.5 pts
    b Bob [NES] HO2 PC | 2.5 pts
    c Carol [NES] HO3 HO1 | 5.5 pts
    ");
}

#[test]
fn exports_grid_csv_and_result_json() {
    let dir = tempdir().unwrap();
    let (doctors, result) = small_run();

    let csv_path = dir.path().join("grid.csv");
    io::export_allocation_csv(&csv_path, &doctors, &result).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("doctor_id,name,team,1,2,run_points"));
    assert_eq!(lines.next(), Some("a,Alice,NES,HO1,PC,1.50"));
    assert_eq!(lines.next(), Some("b,Bob,NES,HO2,PC,1.50"));
    assert_eq!(lines.next(), Some("c,Carol,NES,HO3,HO1,3.25"));

    let json_path = dir.path().join("result.json");
    io::export_result_json(&json_path, &result).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["allocation"]["a"]["1"], "HO1");
    assert_eq!(value["allocation"]["a"]["2"], "PC");
    assert_eq!(value["call_points"]["c"], 3.25);
    assert_eq!(value["call_counts"]["HO1"]["c"], 1);
    assert_eq!(value["staffing"]["1"]["NES"]["minimum"], 2);
    assert_eq!(value["unfilled"][0]["tier"], "HO2");
}

#[test]
fn imports_doctors_and_requests_from_csv() {
    let dir = tempdir().unwrap();
    let doctors_csv = dir.path().join("doctors.csv");
    fs::write(
        &doctors_csv,
        "id,name,team,cumulative_points\n1,Sarah Chen,NES,17.5\n,Emily Tan,esu,\n",
    )
    .unwrap();
    let doctors = io::import_doctors_csv(&doctors_csv).unwrap();
    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].id, DoctorId::new("1"));
    assert_eq!(doctors[0].cumulative_points, 17.5);
    assert_eq!(doctors[1].team, Team::Esu);
    assert_eq!(doctors[1].cumulative_points, 0.0);
    assert!(!doctors[1].id.as_str().is_empty());

    let requests_csv = dir.path().join("requests.csv");
    fs::write(
        &requests_csv,
        "doctor_id,day,kind\n1,3,AL\n1,4,cb\n1,3,CR\n",
    )
    .unwrap();
    let requests = io::import_requests_csv(&requests_csv).unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests.get(&DoctorId::new("1"), 3), Some(RequestKind::CallRequest));
    assert_eq!(requests.get(&DoctorId::new("1"), 4), Some(RequestKind::CallBlock));

    let bad = dir.path().join("bad.csv");
    fs::write(&bad, "id,name,team\n1,Nobody,XYZ\n").unwrap();
    assert!(io::import_doctors_csv(&bad).is_err());
}

#[test]
fn storage_roundtrip_and_point_carry_over() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    assert_eq!(storage.load_or_default().unwrap(), Roster::default());

    let (doctors, result) = small_run();
    let mut roster = Roster {
        doctors,
        requests: RequestSet::new(),
    };
    roster
        .requests
        .insert(DoctorId::new("a"), 5, RequestKind::AnnualLeave);
    let unknown = roster.apply_call_points(&result.call_points);
    assert!(unknown.is_empty());
    storage.save(&roster).unwrap();

    let loaded = storage.load().unwrap();
    assert_eq!(loaded, roster);
    let carol = loaded.find_doctor_by_id(&DoctorId::new("c")).unwrap();
    assert_eq!(carol.cumulative_points, 5.5);
    assert_eq!(
        loaded.requests.get(&DoctorId::new("a"), 5),
        Some(RequestKind::AnnualLeave)
    );
}

#[test]
fn corrupt_roster_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    fs::write(&path, r#"{ "doctors": [ { "id": "a" "#).unwrap();
    let storage = JsonStorage::open(&path).unwrap();

    let err = format!("{:#}", storage.load().unwrap_err());
    assert!(err.contains("parsing roster"), "{err}");
    assert!(err.contains(&path.display().to_string()), "{err}");
    assert!(storage.load_or_default().is_err());

    // un dossier ne peut pas servir de roster
    assert!(JsonStorage::open(dir.path()).is_err());
}
