use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use crate::groups::controller::{confirm_delete, AfterDelete, DeletePrompt, DELETED_BODY, DELETED_HEADING};
use crate::ui::main_window::GroupsPage;

/// Asks before deleting. The dialog only closes on cancel or once the delete went through.
pub fn confirm(page: &Rc<GroupsPage>, prompt: DeletePrompt) {
    let dialog = gtk::Dialog::builder()
        .title(prompt.heading.as_str())
        .transient_for(&page.window)
        .modal(true)
        .deletable(false)
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_margin_top(18);
    content.set_margin_bottom(18);
    content.set_margin_start(18);
    content.set_margin_end(18);

    let heading = gtk::Label::new(Some(prompt.heading.as_str()));
    heading.add_css_class("title-2");
    content.append(&heading);

    let body = gtk::Label::new(Some(prompt.body.as_str()));
    body.set_wrap(true);
    content.append(&body);

    let error = gtk::Label::new(None);
    error.add_css_class("error");
    error.set_wrap(true);
    error.set_visible(false);
    content.append(&error);

    dialog.content_area().append(&content);
    let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
    let delete_btn = dialog.add_button(&prompt.confirm_label, gtk::ResponseType::Ok);
    delete_btn.add_css_class("destructive-action");
    dialog.set_default_response(gtk::ResponseType::Cancel);

    let page = page.clone();
    dialog.connect_response(move |dlg, resp| {
        if resp != gtk::ResponseType::Ok {
            dlg.close();
            return;
        }
        delete_btn.set_sensitive(false);
        error.set_visible(false);

        let api = page.api.clone();
        let prompt = prompt.clone();
        let rx = crate::utils::run_async_to_main(async move { confirm_delete(api.as_ref(), &prompt).await });

        let dlg = dlg.clone();
        let page = page.clone();
        let error = error.clone();
        let delete_btn = delete_btn.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(AfterDelete::ReloadPage) => {
                    dlg.close();
                    show_deleted(&page);
                }
                Err(err) => {
                    log::warn!("Deleting group failed: {}", err);
                    error.set_text(&err.user_message());
                    error.set_visible(true);
                    delete_btn.set_sensitive(true);
                }
            }
            glib::ControlFlow::Continue
        });
    });

    dialog.present();
}

fn show_deleted(page: &Rc<GroupsPage>) {
    let done = gtk::MessageDialog::builder()
        .transient_for(&page.window)
        .modal(true)
        .message_type(gtk::MessageType::Info)
        .buttons(gtk::ButtonsType::Ok)
        .text(DELETED_HEADING)
        .secondary_text(DELETED_BODY)
        .build();
    let page = page.clone();
    done.connect_response(move |dlg, _| {
        dlg.close();
        page.reload_page();
    });
    done.present();
}
