use adw::prelude::*;
use adw::Application;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::api::client::{ApiClient, GroupsApi};
use crate::api::models::GroupSummary;
use crate::app::AppSettings;
use crate::groups::controller::{DeletePrompt, EditMode, GroupEditor, GroupList, LIST_FETCH_ERROR};
use crate::ui::group_list::GroupListView;

/// The groups page: header actions, the summary table and page-level toasts.
pub struct GroupsPage {
    pub window: adw::ApplicationWindow,
    overlay: adw::ToastOverlay,
    list_view: GroupListView,
    pub api: Arc<dyn GroupsApi>,
    groups: RefCell<GroupList>,
    pub editor: Rc<RefCell<GroupEditor>>,
}

impl GroupsPage {
    pub fn toast(&self, message: &str) {
        self.overlay.add_toast(adw::Toast::new(message));
    }

    /// Errors stay up until the user closes them.
    pub fn error_toast(&self, message: &str) {
        let toast = adw::Toast::new(message);
        toast.set_timeout(0);
        self.overlay.add_toast(toast);
    }

    /// Fetches the summaries and replaces the table.
    pub fn load(self: &Rc<Self>) {
        self.list_view.show_loading();
        let api = self.api.clone();
        let rx = crate::utils::run_async_to_main(async move { api.summaries().await });

        let page = self.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(summaries) => {
                    log::debug!("Loaded {} groups", summaries.total);
                    let state = page.groups.borrow_mut().apply(summaries);
                    let on_edit: Rc<dyn Fn(i64)> = {
                        let page = page.clone();
                        Rc::new(move |id| page.edit(EditMode::Existing(id)))
                    };
                    let on_delete: Rc<dyn Fn(GroupSummary)> = {
                        let page = page.clone();
                        Rc::new(move |group| page.delete_group(&group))
                    };
                    page.list_view.show(state, on_edit, on_delete);
                }
                Err(err) => {
                    log::error!("Failed to load groups: {}", err);
                    page.list_view.restore();
                    page.error_toast(LIST_FETCH_ERROR);
                }
            }
            glib::ControlFlow::Continue
        });
    }

    /// Drops every piece of page state and loads from scratch.
    pub fn reload_page(self: &Rc<Self>) {
        log::info!("Reloading groups page");
        self.groups.borrow_mut().reset();
        self.editor.borrow_mut().dismiss();
        self.load();
    }

    pub fn edit(self: &Rc<Self>, mode: EditMode) {
        crate::ui::group_dialog::GroupDialog::open(self, mode);
    }

    pub fn delete_group(self: &Rc<Self>, group: &GroupSummary) {
        let prompt = DeletePrompt::for_group(&self.groups.borrow(), group);
        let Some(prompt) = prompt else {
            log::debug!("Group {} is no longer listed; ignoring delete", group.id);
            return;
        };
        crate::ui::delete_dialog::confirm(self, prompt);
    }

    fn download_csv_template(&self) {
        let dir = crate::groups::template::download_dir();
        match crate::groups::template::write_template(&dir) {
            Ok(path) => self.toast(&format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Failed to write CSV template: {}", e);
                self.error_toast(&format!("Could not save template: {}", e));
            }
        }
    }
}

pub fn show_main_window(app: &Application, settings: AppSettings) {
    let api: Arc<dyn GroupsApi> = match ApiClient::from_settings(&settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Cannot build API client: {}", e);
            crate::ui::login::show_login_window(app);
            return;
        }
    };

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Users & Groups")
        .default_width(960)
        .default_height(640)
        .build();

    let overlay = adw::ToastOverlay::new();
    let list_view = GroupListView::new();
    overlay.set_child(Some(&list_view.widget()));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some("Users & Groups"));
    header.set_title_widget(Some(&title));

    let new_group_btn = gtk4::Button::with_label("New Group");
    new_group_btn.add_css_class("suggested-action");
    header.pack_start(&new_group_btn);

    let template_btn = gtk4::Button::with_label("Download CSV Template");
    header.pack_end(&template_btn);

    let server_btn = gtk4::Button::from_icon_name("network-server-symbolic");
    server_btn.set_tooltip_text(Some(format!("Connected to {}", settings.base_url).as_str()));
    header.pack_end(&server_btn);

    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let page = Rc::new(GroupsPage {
        window: window.clone(),
        overlay,
        list_view,
        api,
        groups: RefCell::new(GroupList::new()),
        editor: Rc::new(RefCell::new(GroupEditor::new())),
    });

    {
        let page = page.clone();
        new_group_btn.connect_clicked(move |_| page.edit(EditMode::New));
    }
    {
        let page = page.clone();
        template_btn.connect_clicked(move |_| page.download_csv_template());
    }
    {
        let app = app.clone();
        let window = window.clone();
        server_btn.connect_clicked(move |_| {
            crate::ui::login::show_login_window(&app);
            window.close();
        });
    }

    window.present();
    page.load();
}
