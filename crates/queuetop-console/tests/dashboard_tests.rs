//! Tests for the coordination loop and the renderer.
//!
//! Verifies:
//! - Header, body slice and footer rendering
//! - Scroll coalescing, clamping and resize re-clamping
//! - Sort key-presses reorder the owned snapshot
//! - Redraws are idempotent
//! - Source failures end the loop with an error

use std::time::Duration;

use chrono::{Local, TimeZone, Utc};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::mpsc;

use queuetop_console::dashboard::Flow;
use queuetop_console::events::ControlEvent;
use queuetop_console::{Dashboard, DashboardChannels, DashboardError, PollUpdate};
use queuetop_network::SourceError;
use queuetop_protocol::{Snapshot, SortKey, SortSpec, StatusRow};

fn dashboard(width: u16, height: u16, sort: SortSpec) -> Dashboard<TestBackend> {
    let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    Dashboard::new(terminal, sort)
}

/// Ten queues `q0`..`q9`, where `qN` has N queued jobs.
fn ten_rows() -> Snapshot {
    Snapshot::new(
        (0..10)
            .map(|i| StatusRow::new(format!("q{}", i), i, 0, 1))
            .collect(),
        1,
    )
}

fn buffer(dashboard: &Dashboard<TestBackend>) -> Buffer {
    dashboard.terminal().backend().buffer().clone()
}

fn screen(dashboard: &Dashboard<TestBackend>) -> Vec<String> {
    let buffer = buffer(dashboard);
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|cells| cells.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

fn first_body_row(lines: &[String]) -> String {
    lines[1].split_whitespace().next().unwrap_or_default().to_string()
}

// ═══════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════

#[test]
fn renders_header_body_and_footer() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Queued));
    dash.publish(ten_rows());
    dash.redraw().unwrap();

    let lines = screen(&dash);
    assert!(lines[0].starts_with("Job name"));
    assert!(lines[0].contains("Queued"));
    assert!(lines[0].contains("Workers"));

    // Queued descending: q9 first, four body rows on a six-row screen.
    assert_eq!(first_body_row(&lines), "q9");
    assert!(lines[4].starts_with("q6"));
    assert!(lines[5].ends_with("4/10"), "footer was {:?}", lines[5]);
    assert!(lines[5].contains("Queued"));
}

#[test]
fn header_is_bold() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    dash.redraw().unwrap();
    let buffer = buffer(&dash);
    let cell = &buffer.content()[0];
    assert!(cell
        .modifier
        .contains(ratatui::style::Modifier::BOLD));
}

#[test]
fn numbers_are_right_justified_in_their_columns() {
    let mut dash = dashboard(40, 4, SortSpec::default());
    dash.publish(Snapshot::new(vec![StatusRow::new("job", 7, 12, 3)], 1));
    dash.redraw().unwrap();

    let lines = screen(&dash);
    // Columns: name (40 - 23 - 3 = 14), sep, queued (7), sep, running (8), sep, workers (8).
    assert_eq!(&lines[1][..14], "job           ");
    assert_eq!(&lines[1][15..22], "      7");
    assert_eq!(&lines[1][23..31], "      12");
    assert_eq!(&lines[1][32..40], "       3");
}

#[test]
fn long_names_are_truncated_to_leftover_width() {
    let mut dash = dashboard(30, 4, SortSpec::default());
    dash.publish(Snapshot::new(
        vec![StatusRow::new("a_really_long_queue_name", 1, 0, 0)],
        1,
    ));
    dash.redraw().unwrap();

    let lines = screen(&dash);
    // 30 - 23 - 3 leaves four cells for the name.
    assert!(lines[1].starts_with("a_re "));
}

#[test]
fn footer_shows_host_count_and_local_update_time() {
    let taken_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 30).unwrap();
    let mut dash = dashboard(70, 4, SortSpec::default());
    dash.publish(Snapshot::at(vec![StatusRow::new("a", 1, 0, 0)], 3, taken_at));
    dash.redraw().unwrap();

    let footer = &screen(&dash)[3];
    let expected = taken_at.with_timezone(&Local).format("%H:%M:%S").to_string();
    assert!(footer.contains("3 hosts"), "footer was {:?}", footer);
    assert!(footer.contains(&format!("updated {}", expected)));
    assert!(footer.ends_with("1/1"));
}

#[test]
fn waiting_message_before_first_snapshot() {
    let mut dash = dashboard(60, 5, SortSpec::default());
    dash.redraw().unwrap();
    let lines = screen(&dash);
    assert!(lines[1].starts_with("Waiting for status..."));
    assert!(lines[4].ends_with("0/0"));
}

#[test]
fn empty_snapshot_says_so() {
    let mut dash = dashboard(60, 5, SortSpec::default());
    dash.publish(Snapshot::new(Vec::new(), 2));
    dash.redraw().unwrap();
    let lines = screen(&dash);
    assert!(lines[1].starts_with("No matching queues"));
    assert!(lines[4].contains("2 hosts"));
}

#[test]
fn redraw_is_idempotent() {
    let mut dash = dashboard(60, 8, SortSpec::initial(SortKey::Workers));
    dash.publish(ten_rows());
    dash.scroll(vec![1, 1]);
    dash.redraw().unwrap();
    let first = buffer(&dash);
    dash.redraw().unwrap();
    assert_eq!(first, buffer(&dash));
}

// ═══════════════════════════════════════════════════════════════
// Scrolling
// ═══════════════════════════════════════════════════════════════

#[test]
fn coalesced_scroll_moves_once_per_batch() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    dash.publish(ten_rows());
    dash.redraw().unwrap();
    assert_eq!(dash.viewport().visible_rows(), 4);

    assert!(dash.scroll(vec![1, 1, 1]));
    assert_eq!(dash.viewport().position(), 3);
    dash.redraw().unwrap();
    let lines = screen(&dash);
    assert_eq!(first_body_row(&lines), "q3");
    assert!(lines[5].ends_with("7/10"));

    assert!(dash.scroll(vec![1]));
    assert_eq!(dash.viewport().position(), 4);
}

#[test]
fn scroll_is_clamped_to_last_page() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    dash.publish(ten_rows());
    dash.redraw().unwrap();

    dash.scroll(vec![1; 20]);
    assert_eq!(dash.viewport().position(), 6);
    assert!(!dash.scroll(vec![1]), "already at the bottom");
    dash.redraw().unwrap();
    assert!(screen(&dash)[5].ends_with("10/10"));
}

#[test]
fn resize_reclamps_position() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    dash.publish(ten_rows());
    dash.redraw().unwrap();
    dash.scroll(vec![1; 6]);
    assert_eq!(dash.viewport().position(), 6);

    dash.terminal_mut().backend_mut().resize(60, 10);
    let flow = dash.handle_control(ControlEvent::Resize {
        width: 60,
        height: 10,
    });
    assert_eq!(flow, Flow::Redraw);
    assert_eq!(dash.viewport().position(), 2);

    dash.redraw().unwrap();
    assert_eq!(dash.viewport().visible_rows(), 8);
    assert!(screen(&dash)[9].ends_with("10/10"));
}

#[test]
fn smaller_snapshot_reclamps_position() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    dash.publish(ten_rows());
    dash.redraw().unwrap();
    dash.scroll(vec![1; 6]);

    dash.publish(Snapshot::new(
        vec![StatusRow::new("a", 1, 0, 0), StatusRow::new("b", 1, 0, 0)],
        1,
    ));
    assert_eq!(dash.viewport().position(), 0);
}

// ═══════════════════════════════════════════════════════════════
// Sorting
// ═══════════════════════════════════════════════════════════════

#[test]
fn sort_key_presses_reorder_snapshot() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    dash.publish(ten_rows());
    assert_eq!(dash.snapshot().unwrap().rows()[0].name, "q0");

    assert_eq!(dash.handle_control(ControlEvent::Sort(SortKey::Name)), Flow::Redraw);
    assert!(!dash.sort().ascending);
    assert_eq!(dash.snapshot().unwrap().rows()[0].name, "q9");

    dash.handle_control(ControlEvent::Sort(SortKey::Queued));
    assert_eq!(
        dash.sort(),
        SortSpec {
            key: SortKey::Queued,
            ascending: false
        }
    );
    assert_eq!(dash.snapshot().unwrap().rows()[0].name, "q9");

    dash.handle_control(ControlEvent::Sort(SortKey::Queued));
    assert_eq!(dash.snapshot().unwrap().rows()[0].name, "q0");
}

#[test]
fn new_snapshot_uses_current_sort() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Workers));
    dash.publish(Snapshot::new(
        vec![StatusRow::new("few", 0, 0, 1), StatusRow::new("many", 0, 0, 9)],
        1,
    ));
    assert_eq!(dash.snapshot().unwrap().rows()[0].name, "many");
}

#[test]
fn quit_and_redraw_controls() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    assert_eq!(dash.handle_control(ControlEvent::Quit), Flow::Quit);
    assert_eq!(dash.handle_control(ControlEvent::Redraw), Flow::Redraw);
}

// ═══════════════════════════════════════════════════════════════
// Coordination loop
// ═══════════════════════════════════════════════════════════════

struct Senders {
    updates: mpsc::Sender<PollUpdate>,
    control: mpsc::Sender<ControlEvent>,
    scroll: mpsc::Sender<i8>,
}

fn channels() -> (Senders, DashboardChannels) {
    let (updates_tx, updates) = mpsc::channel(4);
    let (control_tx, control) = mpsc::channel(4);
    let (scroll_tx, scroll) = mpsc::channel(16);
    (
        Senders {
            updates: updates_tx,
            control: control_tx,
            scroll: scroll_tx,
        },
        DashboardChannels {
            updates,
            control,
            scroll,
        },
    )
}

#[test]
fn failed_update_is_an_error() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    let result = dash.handle_update(PollUpdate::Failed(SourceError::Closed {
        host: "gm:4730".into(),
    }));
    assert!(matches!(result, Err(DashboardError::Source(_))));
}

#[tokio::test]
async fn run_returns_source_failure() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    let (senders, rx) = channels();
    senders
        .updates
        .send(PollUpdate::Failed(SourceError::Closed {
            host: "gm:4730".into(),
        }))
        .await
        .unwrap();

    let err = dash.run(rx).await.unwrap_err();
    assert!(matches!(err, DashboardError::Source(_)));
    assert!(err.to_string().contains("gm:4730"));
}

#[tokio::test]
async fn run_stops_on_quit() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    let (senders, rx) = channels();
    senders.control.send(ControlEvent::Quit).await.unwrap();
    assert!(dash.run(rx).await.is_ok());
}

#[tokio::test]
async fn run_reports_stopped_poller() {
    let mut dash = dashboard(60, 6, SortSpec::default());
    let (senders, rx) = channels();
    drop(senders.updates);
    let err = dash.run(rx).await.unwrap_err();
    assert!(matches!(err, DashboardError::PollerStopped));
}

#[tokio::test]
async fn run_applies_snapshot_then_burst_of_scrolls() {
    let mut dash = dashboard(60, 6, SortSpec::initial(SortKey::Name));
    let (senders, rx) = channels();

    let driver = async {
        senders
            .updates
            .send(PollUpdate::Snapshot(ten_rows()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        for _ in 0..3 {
            senders.scroll.send(1).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
        senders.control.send(ControlEvent::Quit).await.unwrap();
    };

    let (result, ()) = tokio::join!(dash.run(rx), driver);
    result.unwrap();

    assert_eq!(dash.viewport().position(), 3);
    let lines = screen(&dash);
    assert_eq!(first_body_row(&lines), "q3");
    assert!(lines[5].ends_with("7/10"));
}
