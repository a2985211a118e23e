use super::*;
use crate::app::SERVER_DOWN_MESSAGE;
use crate::tests_support::signed_in_context;
use crate::ui::Level;

fn loaded(ticket: RequestTicket, ids: &[&str]) -> ListLoaded {
    ListLoaded {
        ticket,
        tickets: Ok(ids.iter().map(|s| TicketId::new(*s)).collect()),
        profile: None,
    }
}

#[test]
fn preview_name_shortens_well_formed_ids() {
    assert_eq!(
        preview_name("2024-01-15T12_30_45.123456Hdeadbeefcafe"),
        "2024/01/15 12:30:45 deadbeef"
    );
    assert_eq!(preview_name("plain-id"), "plain-id");
    assert_eq!(preview_name("2024-01-15Habc"), "2024-01-15Habc");
}

#[test]
fn superseded_load_is_not_applied() {
    let mut view = TicketListView::new(signed_in_context(1, false), None);
    let Step::Request(first) = view.begin_load() else {
        panic!("own list should load");
    };
    let Step::Request(second) = view.begin_load() else {
        panic!("own list should load");
    };

    assert!(view.apply_load(loaded(second.ticket.clone(), &["new"])));
    assert!(!view.apply_load(loaded(first.ticket.clone(), &["stale"])));
    assert_eq!(view.tickets(), Some(&[TicketId::new("new")][..]));
}

#[test]
fn non_admin_cannot_open_another_users_list() {
    let mut view = TicketListView::new(signed_in_context(1, false), Some(UserId(2)));
    assert!(!view.is_self());
    assert!(matches!(
        view.begin_load(),
        Step::Done(Outcome::Navigate(path)) if path == "/ticket"
    ));
}

#[test]
fn admin_loads_another_users_list_with_profile() {
    let mut view = TicketListView::new(signed_in_context(1, true), Some(UserId(2)));
    let Step::Request(req) = view.begin_load() else {
        panic!("admin should load");
    };
    assert!(req.fetch_profile);
    assert_eq!(req.user, Some(UserId(2)));
}

#[test]
fn own_numeric_id_counts_as_self() {
    let view = TicketListView::new(signed_in_context(5, false), Some(UserId(5)));
    assert!(view.is_self());
    assert_eq!(
        view.ticket_path(&TicketId::new("t1")),
        "/ticket/5/t1"
    );
}

#[test]
fn ticket_path_uses_own_id_for_self_list() {
    let view = TicketListView::new(signed_in_context(9, false), None);
    assert_eq!(view.ticket_path(&TicketId::new("t1")), "/ticket/9/t1");
}

#[test]
fn edits_are_limited_to_own_tickets() {
    let mut other = TicketListView::new(signed_in_context(1, true), Some(UserId(2)));
    other.open_edit(TicketId::new("t1"), true);
    assert!(other.edit_state().is_none());
    assert!(!other.delete(&TicketId::new("t1")));

    let mut own = TicketListView::new(signed_in_context(1, false), None);
    own.open_edit(TicketId::new("t1"), true);
    own.set_edit_public(false);
    assert_eq!(
        own.edit_state(),
        Some(&EditState {
            ticket: TicketId::new("t1"),
            public: false
        })
    );
    assert_eq!(own.last_edited(), Some(&TicketId::new("t1")));
    own.cancel_edit();
    assert!(own.edit_state().is_none());
}

#[test]
fn unreachable_server_shows_server_down_only() {
    let ctx = signed_in_context(1, false);
    let mut view = TicketListView::new(ctx.clone(), None);
    assert_eq!(view.load(), Outcome::Stay);
    assert!(view.tickets().is_none());

    let shown = ctx.messages().active();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].level, Level::Error);
    assert_eq!(shown[0].text, SERVER_DOWN_MESSAGE);
    assert!(!ctx.loading().is_loading());
}

#[test]
fn sorted_follows_toggle() {
    let mut view = TicketListView::new(signed_in_context(1, false), None);
    let Step::Request(req) = view.begin_load() else {
        panic!("own list should load");
    };
    view.apply_load(loaded(
        req.ticket.clone(),
        &["2024-01-01T00_00_00.0Ha", "2024-02-01T00_00_00.0Hb"],
    ));
    assert_eq!(
        view.sorted().expect("loaded")[0].as_str(),
        "2024-02-01T00_00_00.0Hb"
    );
    view.toggle_order();
    assert!(view.is_ascending());
    assert_eq!(
        view.sorted().expect("loaded")[0].as_str(),
        "2024-01-01T00_00_00.0Ha"
    );
}
