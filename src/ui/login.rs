use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;

use crate::api::client::{ApiClient, GroupsApi};
use crate::app::AppSettings;

pub fn show_login_window(app: &Application) {
    let current = AppSettings::load();

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Gophish Login")
        .default_width(420)
        .default_height(300)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Connect to Gophish"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let server_entry = gtk::Entry::new();
    server_entry.set_placeholder_text(Some("Admin URL (e.g. https://127.0.0.1:3333)"));
    server_entry.set_hexpand(true);
    server_entry.set_text(&current.base_url);

    let key_entry = gtk::PasswordEntry::new();
    key_entry.set_placeholder_text(Some("API Key"));
    key_entry.set_show_peek_icon(true);
    key_entry.set_hexpand(true);
    key_entry.set_text(&current.api_key);

    let insecure_check = gtk::CheckButton::with_label("Accept self-signed certificates");
    insecure_check.set_active(current.accept_invalid_certs);

    let form = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form.append(&server_entry);
    form.append(&key_entry);
    form.append(&insecure_check);
    root.append(&form);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let login_btn = gtk::Button::with_label("Connect");
    login_btn.add_css_class("suggested-action");
    login_btn.set_halign(gtk::Align::End);
    root.append(&login_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let header_title = gtk::Label::new(Some("Gophish Groups"));
    header.set_title_widget(Some(&header_title));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let on_connect = {
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let server_entry = server_entry.clone();
        let key_entry = key_entry.clone();
        let insecure_check = insecure_check.clone();
        move || {
            let settings = AppSettings {
                base_url: crate::utils::normalize_url(&server_entry.text()),
                api_key: key_entry.text().trim().to_string(),
                accept_invalid_certs: insecure_check.is_active(),
                ..current.clone()
            };
            if !settings.is_complete() {
                overlay.add_toast(adw::Toast::new("Please enter the admin URL and API key."));
                return;
            }

            status.set_label("Connecting…");

            // A summary fetch proves both the URL and the key.
            let settings_for_async = settings.clone();
            let rx = crate::utils::run_async_to_main(async move {
                let client = ApiClient::from_settings(&settings_for_async)?;
                client.summaries().await
            });

            let status_label = status.clone();
            let app2 = app.clone();
            let window2 = window.clone();
            let overlay2 = overlay.clone();
            rx.attach(None, move |res| {
                match res {
                    Ok(summaries) => {
                        log::info!("Connected to {} ({} groups)", settings.base_url, summaries.total);
                        status_label.set_label("Connected");
                        if let Err(e) = settings.save() {
                            log::warn!("Failed to save settings: {}", e);
                            overlay2.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", e)));
                        }
                        crate::ui::main_window::show_main_window(&app2, settings.clone());
                        window2.close();
                    }
                    Err(err) => {
                        log::warn!("Connection check failed (status {:?}): {}", err.status(), err);
                        status_label.set_label("Connection failed");
                        overlay2.add_toast(adw::Toast::new(&err.user_message()));
                    }
                }
                glib::ControlFlow::Continue
            });
        }
    };

    use std::rc::Rc;
    let on_connect: Rc<dyn Fn()> = Rc::new(on_connect);
    {
        let on_connect = on_connect.clone();
        login_btn.connect_clicked(move |_| (on_connect)());
    }
    {
        let on_connect = on_connect.clone();
        server_entry.connect_activate(move |_| (on_connect)());
    }
    {
        let on_connect = on_connect.clone();
        key_entry.connect_activate(move |_| (on_connect)());
    }

    window.present();
}
