use chrono::NaiveDate;
use uuid::Uuid;

use dispatch_timeline::io::{run_export, CsvExporter, PngExporter};
use dispatch_timeline::model::{
    Granularity, LayoutConfig, ScaleConfig, TicketBlock, TimelineItem, TimelineLayout, TimelineWindow, ViewMode,
};
use dispatch_timeline::notify::{NotificationKind, ToastQueue};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn board() -> Vec<TimelineItem> {
    let agent = Uuid::new_v4();
    vec![
        TimelineItem::span("Chiller upgrade", ymd(2024, 3, 4), ymd(2024, 3, 22)),
        TimelineItem::milestone("Permit approved", ymd(2024, 3, 8)),
        TicketBlock::new("Drain pan", ymd(2024, 3, 11)).assigned_to(agent, "Dana Lee").into(),
        TicketBlock::new("Belt tension", ymd(2024, 3, 12)).into(),
        TicketBlock::new("Coil wash", ymd(2024, 3, 14)).assigned_to(agent, "Dana Lee").into(),
    ]
}

fn window() -> TimelineWindow {
    TimelineWindow::select(Granularity::Week, ymd(2024, 3, 15), &ScaleConfig::default())
}

#[test]
fn png_export_writes_one_file_and_one_success() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.png");
    let items = board();
    let layout = TimelineLayout::compute(window(), &items, ymd(2024, 3, 13), ViewMode::Project, &LayoutConfig::default());
    let toasts = ToastQueue::default();

    assert!(run_export(&PngExporter::default(), &layout, &path, &toasts));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let image = image::open(&path).unwrap();
    assert_eq!(image.width(), PngExporter::default().label_width + layout.content_width.ceil() as u32);

    let kinds: Vec<_> = toasts.active().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Success]);
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn failed_export_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("board.png");
    let items = board();
    let layout = TimelineLayout::compute(window(), &items, ymd(2024, 3, 13), ViewMode::Project, &LayoutConfig::default());
    let toasts = ToastQueue::default();

    assert!(!run_export(&PngExporter::default(), &layout, &path, &toasts));

    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    let active = toasts.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, NotificationKind::Failure);
}

#[test]
fn empty_board_is_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let layout = TimelineLayout::compute(window(), &[], ymd(2024, 3, 13), ViewMode::Project, &LayoutConfig::default());
    let toasts = ToastQueue::default();

    assert!(!run_export(&CsvExporter, &layout, &path, &toasts));
    assert!(!path.exists());
    assert_eq!(toasts.latest().map(|n| n.kind), Some(NotificationKind::Failure));
}

#[test]
fn csv_rows_follow_resource_lanes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.csv");
    let items = board();
    let layout = TimelineLayout::compute(window(), &items, ymd(2024, 3, 13), ViewMode::Resource, &LayoutConfig::default());
    let toasts = ToastQueue::default();

    assert!(run_export(&CsvExporter, &layout, &path, &toasts));

    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), ["Kind", "Label", "Start", "End", "Status", "Assignee"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    let labels: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
    assert_eq!(
        labels,
        ["Chiller upgrade", "Permit approved", "Drain pan", "Coil wash", "Belt tension"]
    );
    assert_eq!(&rows[0][2], "2024-03-04");
    assert_eq!(&rows[0][3], "2024-03-22");
    assert_eq!(&rows[2][5], "Dana Lee");
    assert_eq!(&rows[4][5], "");
}
