use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::models::GroupSummary;
use crate::groups::controller::{GroupRow, ListState};

const LOADING: &str = "loading";
const EMPTY: &str = "empty";
const TABLE: &str = "table";
const UNAVAILABLE: &str = "unavailable";

/// Remembers the last page that showed real data, so a failed load can go back to it.
#[derive(Debug)]
struct PageMemory {
    last_good: String,
}

impl Default for PageMemory {
    // Nothing has loaded yet, so claiming the list is empty would be wrong.
    fn default() -> Self {
        Self { last_good: UNAVAILABLE.to_string() }
    }
}

impl PageMemory {
    fn leaving(&mut self, current: Option<&str>) {
        if let Some(current) = current.filter(|c| *c != LOADING) {
            self.last_good = current.to_string();
        }
    }

    fn after_failure(&self) -> &str {
        &self.last_good
    }
}

/// Summary table of groups, with loading and empty states.
pub struct GroupListView {
    stack: gtk::Stack,
    grid: gtk::Grid,
    pages: RefCell<PageMemory>,
}

impl GroupListView {
    pub fn new() -> Self {
        let stack = gtk::Stack::new();
        stack.set_vexpand(true);
        stack.set_hexpand(true);

        let spinner = gtk::Spinner::new();
        spinner.set_spinning(true);
        spinner.set_size_request(32, 32);
        spinner.set_halign(gtk::Align::Center);
        spinner.set_valign(gtk::Align::Center);
        stack.add_named(&spinner, Some(LOADING));

        let empty = adw::StatusPage::builder()
            .icon_name("system-users-symbolic")
            .title("No groups created yet")
            .description("Let's create one!")
            .build();
        stack.add_named(&empty, Some(EMPTY));

        let unavailable = adw::StatusPage::builder()
            .icon_name("network-error-symbolic")
            .title("Groups unavailable")
            .build();
        stack.add_named(&unavailable, Some(UNAVAILABLE));

        let grid = gtk::Grid::builder()
            .column_spacing(24)
            .row_spacing(8)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .build();
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .child(&grid)
            .build();
        stack.add_named(&scroller, Some(TABLE));

        Self {
            stack,
            grid,
            pages: RefCell::new(PageMemory::default()),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.stack.clone().upcast()
    }

    pub fn show_loading(&self) {
        let current = self.stack.visible_child_name();
        self.pages.borrow_mut().leaving(current.as_deref());
        self.stack.set_visible_child_name(LOADING);
    }

    /// Goes back to whatever was shown before the failed load.
    pub fn restore(&self) {
        let previous = self.pages.borrow().after_failure().to_string();
        self.stack.set_visible_child_name(&previous);
    }

    pub fn show(
        &self,
        state: ListState,
        on_edit: Rc<dyn Fn(i64)>,
        on_delete: Rc<dyn Fn(GroupSummary)>,
    ) {
        match state {
            ListState::Empty => self.stack.set_visible_child_name(EMPTY),
            ListState::Groups(rows) => {
                self.set_rows(rows, on_edit, on_delete);
                self.stack.set_visible_child_name(TABLE);
            }
        }
    }

    fn set_rows(&self, rows: Vec<GroupRow>, on_edit: Rc<dyn Fn(i64)>, on_delete: Rc<dyn Fn(GroupSummary)>) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
        for (col, title) in ["Name", "# of Members", "Modified Date"].iter().enumerate() {
            let lbl = gtk::Label::new(Some(*title));
            lbl.add_css_class("heading");
            lbl.set_halign(gtk::Align::Start);
            self.grid.attach(&lbl, col as i32, 0, 1, 1);
        }

        for (i, row) in rows.into_iter().enumerate() {
            let y = i as i32 + 1;
            for (col, text) in [&row.name, &row.num_targets, &row.modified].iter().enumerate() {
                let lbl = gtk::Label::new(None);
                lbl.set_markup(text);
                lbl.set_halign(gtk::Align::Start);
                lbl.set_hexpand(col == 0);
                self.grid.attach(&lbl, col as i32, y, 1, 1);
            }

            let actions = gtk::Box::new(gtk::Orientation::Horizontal, 6);
            actions.set_halign(gtk::Align::End);
            let edit_btn = gtk::Button::from_icon_name("document-edit-symbolic");
            edit_btn.set_tooltip_text(Some("Edit"));
            edit_btn.add_css_class("suggested-action");
            let delete_btn = gtk::Button::from_icon_name("user-trash-symbolic");
            delete_btn.set_tooltip_text(Some("Delete"));
            delete_btn.add_css_class("destructive-action");
            actions.append(&edit_btn);
            actions.append(&delete_btn);
            self.grid.attach(&actions, 3, y, 1, 1);

            {
                let on_edit = on_edit.clone();
                let id = row.group.id;
                edit_btn.connect_clicked(move |_| (on_edit)(id));
            }
            {
                let on_delete = on_delete.clone();
                let group = row.group;
                delete_btn.connect_clicked(move |_| (on_delete)(group.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failed_load_does_not_claim_empty() {
        let mut pages = PageMemory::default();
        pages.leaving(Some(LOADING));
        assert_eq!(pages.after_failure(), UNAVAILABLE);
    }

    #[test]
    fn failed_reload_returns_to_last_shown_page() {
        let mut pages = PageMemory::default();
        pages.leaving(Some(TABLE));
        pages.leaving(Some(LOADING));
        assert_eq!(pages.after_failure(), TABLE);

        pages.leaving(Some(EMPTY));
        assert_eq!(pages.after_failure(), EMPTY);
    }

    #[test]
    fn unnamed_page_keeps_previous_memory() {
        let mut pages = PageMemory::default();
        pages.leaving(Some(TABLE));
        pages.leaving(None);
        assert_eq!(pages.after_failure(), TABLE);
    }
}
