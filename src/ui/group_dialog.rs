use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::api::models::Target;
use crate::groups::controller::{
    check_import_file, import_targets, save_group, EditMode, EditTicket, GROUP_FETCH_ERROR,
};
use crate::groups::targets::{validate_entry, TargetRow};
use crate::ui::main_window::GroupsPage;

const COLUMNS: [&str; 12] = [
    "First Name",
    "Last Name",
    "Email",
    "Position",
    "Department",
    "Dep. Number",
    "Age",
    "Gender",
    "Site",
    "Phone",
    "Degree",
    "Description",
];

fn cells(row: &TargetRow) -> [&str; 12] {
    [
        &row.first_name,
        &row.last_name,
        &row.email,
        &row.position,
        &row.department,
        &row.department_number,
        &row.age,
        &row.gender,
        &row.site,
        &row.phone,
        &row.degree,
        &row.description,
    ]
}

/// Manual entry inputs, in the same order as `COLUMNS`.
struct TargetForm {
    entries: Vec<gtk::Entry>,
}

impl TargetForm {
    fn new() -> Self {
        let entries = COLUMNS
            .iter()
            .map(|title| {
                let entry = gtk::Entry::new();
                entry.set_placeholder_text(Some(*title));
                entry.set_width_chars(10);
                entry
            })
            .collect::<Vec<_>>();
        entries[2].set_input_purpose(gtk::InputPurpose::Email);
        Self { entries }
    }

    fn target(&self) -> Target {
        let v = |i: usize| self.entries[i].text().to_string();
        Target {
            first_name: v(0),
            last_name: v(1),
            email: v(2).trim().to_string(),
            position: v(3),
            department: v(4),
            department_number: v(5),
            age: v(6),
            gender: v(7),
            site: v(8),
            phone: v(9),
            degree: v(10),
            description: v(11),
        }
    }

    fn reset(&self) {
        for entry in &self.entries {
            entry.set_text("");
        }
        self.entries[0].grab_focus();
    }
}

/// The create/edit dialog. A fresh one is built for every `open`.
pub struct GroupDialog {
    page: Rc<GroupsPage>,
    ticket: EditTicket,
    dialog: gtk::Dialog,
    save_btn: gtk::Widget,
    name_entry: gtk::Entry,
    form: TargetForm,
    table: gtk::Grid,
    message: gtk::Label,
    chooser: RefCell<Option<gtk::FileChooserNative>>,
}

impl GroupDialog {
    pub fn open(page: &Rc<GroupsPage>, mode: EditMode) {
        let ticket = page.editor.borrow_mut().open(mode);
        log::debug!("Opening group dialog ({:?})", mode);

        let dialog = gtk::Dialog::builder()
            .title(mode.title())
            .transient_for(&page.window)
            .modal(true)
            .default_width(900)
            .default_height(560)
            .build();

        let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
        content.set_margin_top(12);
        content.set_margin_bottom(12);
        content.set_margin_start(12);
        content.set_margin_end(12);

        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some("Group name"));
        name_entry.set_hexpand(true);
        content.append(&name_entry);

        let form = TargetForm::new();
        let form_box = gtk::FlowBox::new();
        form_box.set_selection_mode(gtk::SelectionMode::None);
        form_box.set_max_children_per_line(6);
        for entry in &form.entries {
            form_box.insert(entry, -1);
        }
        content.append(&form_box);

        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let add_btn = gtk::Button::with_label("Add");
        add_btn.add_css_class("suggested-action");
        let import_btn = gtk::Button::with_label("Bulk Import Users");
        actions.append(&add_btn);
        actions.append(&import_btn);
        content.append(&actions);

        let message = gtk::Label::new(None);
        message.set_halign(gtk::Align::Start);
        message.set_wrap(true);
        message.set_visible(false);
        content.append(&message);

        let table = gtk::Grid::builder().column_spacing(16).row_spacing(6).build();
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .child(&table)
            .build();
        content.append(&scroller);

        dialog.content_area().append(&content);
        let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
        let save_btn = dialog.add_button("Save changes", gtk::ResponseType::Ok);
        save_btn.add_css_class("suggested-action");
        save_btn.set_sensitive(page.editor.borrow().can_save());

        let this = Rc::new(Self {
            page: page.clone(),
            ticket,
            dialog: dialog.clone(),
            save_btn,
            name_entry: name_entry.clone(),
            form,
            table,
            message,
            chooser: RefCell::new(None),
        });
        this.render_rows();

        let on_add: Rc<dyn Fn()> = {
            let this = this.clone();
            Rc::new(move || this.add_from_form())
        };
        {
            let on_add = on_add.clone();
            add_btn.connect_clicked(move |_| (on_add)());
        }
        for entry in &this.form.entries {
            let on_add = on_add.clone();
            entry.connect_activate(move |_| (on_add)());
        }
        {
            let this = this.clone();
            import_btn.connect_clicked(move |_| this.choose_import_file());
        }
        {
            let this = this.clone();
            dialog.connect_response(move |dlg, resp| match resp {
                gtk::ResponseType::Ok => this.save(),
                _ => dlg.close(),
            });
        }
        {
            // Covers cancel, save and the window's own close button.
            let this = this.clone();
            dialog.connect_close_request(move |_| {
                this.dismiss();
                gtk::glib::Propagation::Proceed
            });
        }

        if let EditMode::Existing(id) = mode {
            this.fetch(id);
        }
        dialog.present();
    }

    fn fetch(self: &Rc<Self>, id: i64) {
        let api = self.page.api.clone();
        let rx = crate::utils::run_async_to_main(async move { api.group(id).await });
        let this = self.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(group) => {
                    let applied = this.page.editor.borrow_mut().apply_loaded(this.ticket, &group);
                    if applied {
                        this.name_entry.set_text(&group.name);
                        this.save_btn.set_sensitive(true);
                        this.render_rows();
                    }
                }
                Err(err) => {
                    log::error!("Failed to fetch group {}: {}", id, err);
                    this.page.error_toast(GROUP_FETCH_ERROR);
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn is_current(&self) -> bool {
        self.page.editor.borrow().is_current(self.ticket)
    }

    fn show_error(&self, text: &str) {
        self.message.remove_css_class("success");
        self.message.add_css_class("error");
        self.message.set_text(text);
        self.message.set_visible(true);
    }

    fn clear_message(&self) {
        self.message.set_text("");
        self.message.set_visible(false);
    }

    fn render_rows(self: &Rc<Self>) {
        while let Some(child) = self.table.first_child() {
            self.table.remove(&child);
        }
        for (col, title) in COLUMNS.iter().enumerate() {
            let lbl = gtk::Label::new(Some(*title));
            lbl.add_css_class("heading");
            lbl.set_halign(gtk::Align::Start);
            self.table.attach(&lbl, col as i32, 0, 1, 1);
        }

        let editor = self.page.editor.borrow();
        for (i, row) in editor.targets().rows().iter().enumerate() {
            let y = i as i32 + 1;
            for (col, cell) in cells(row).iter().enumerate() {
                let lbl = gtk::Label::new(None);
                lbl.set_markup(cell);
                lbl.set_halign(gtk::Align::Start);
                lbl.set_ellipsize(gtk::pango::EllipsizeMode::End);
                lbl.set_max_width_chars(24);
                self.table.attach(&lbl, col as i32, y, 1, 1);
            }
            let remove_btn = gtk::Button::from_icon_name("user-trash-symbolic");
            remove_btn.add_css_class("flat");
            remove_btn.set_tooltip_text(Some("Remove"));
            self.table.attach(&remove_btn, COLUMNS.len() as i32, y, 1, 1);

            let this = self.clone();
            remove_btn.connect_clicked(move |_| {
                this.page.editor.borrow_mut().targets_mut().remove(i);
                this.render_rows();
            });
        }
    }

    fn add_from_form(self: &Rc<Self>) {
        let target = self.form.target();
        if let Err(e) = validate_entry(&target) {
            self.show_error(&e.to_string());
            self.form.entries[2].grab_focus();
            return;
        }
        self.clear_message();
        self.page.editor.borrow_mut().targets_mut().add_target(&target);
        self.render_rows();
        self.form.reset();
    }

    fn choose_import_file(self: &Rc<Self>) {
        let chooser = gtk::FileChooserNative::new(
            Some("Import targets"),
            Some(&self.dialog),
            gtk::FileChooserAction::Open,
            Some("_Import"),
            Some("_Cancel"),
        );
        let csv = gtk::FileFilter::new();
        csv.set_name(Some("CSV files"));
        csv.add_pattern("*.csv");
        csv.add_pattern("*.txt");
        chooser.add_filter(&csv);
        let all = gtk::FileFilter::new();
        all.set_name(Some("All files"));
        all.add_pattern("*");
        chooser.add_filter(&all);

        let this = self.clone();
        chooser.connect_response(move |native, resp| {
            if resp == gtk::ResponseType::Accept {
                if let Some(path) = native.file().and_then(|f| f.path()) {
                    this.import(path);
                }
            }
            this.chooser.borrow_mut().take();
        });
        chooser.show();
        *self.chooser.borrow_mut() = Some(chooser);
    }

    fn import(self: &Rc<Self>, path: PathBuf) {
        self.clear_message();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(e) = check_import_file(&file_name) {
            self.show_error(&e.user_message());
            return;
        }

        let api = self.page.api.clone();
        let rx = crate::utils::run_async_to_main(async move {
            let contents = tokio::fs::read(&path).await.map_err(crate::error::ApiError::from)?;
            import_targets(api.as_ref(), &file_name, contents).await
        });
        let this = self.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(targets) => {
                    if this.is_current() {
                        let added = this.page.editor.borrow_mut().targets_mut().merge(&targets);
                        log::debug!("Import added {} new rows", added);
                        this.render_rows();
                    }
                }
                Err(err) => {
                    log::warn!("CSV import failed: {}", err);
                    if this.is_current() {
                        this.show_error(&err.user_message());
                    }
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn save(self: &Rc<Self>) {
        let (mode, payload) = {
            let mut editor = self.page.editor.borrow_mut();
            if !editor.can_save() {
                log::debug!("Ignoring save before the group finished loading");
                return;
            }
            editor.set_name(&self.name_entry.text());
            log::debug!("Saving group {:?} with {} targets", editor.name(), editor.targets().len());
            (editor.mode(), editor.payload())
        };
        let api = self.page.api.clone();
        let rx = crate::utils::run_async_to_main(async move { save_group(api.as_ref(), mode, payload).await });
        let this = self.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(outcome) => {
                    this.page.toast(outcome.success_message());
                    this.page.load();
                    this.dialog.close();
                }
                Err(err) => {
                    log::warn!("Saving group failed: {}", err);
                    this.show_error(&err.user_message());
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn dismiss(&self) {
        if self.is_current() {
            self.page.editor.borrow_mut().dismiss();
        }
        self.name_entry.set_text("");
        self.clear_message();
        while let Some(child) = self.table.first_child() {
            self.table.remove(&child);
        }
    }
}
