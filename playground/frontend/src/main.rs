use minipen::platform::browser::{
    self, BrowserClock, BrowserController, IFRAME_SANDBOX, IframeSurface, LocalStorage,
};
use minipen::zoon::*;
use minipen::{
    KeyPress, Notification, Pane, PaneFocus, PlaygroundConfig, text as text_offsets,
};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlTextAreaElement;

const APP_BACKGROUND_GRADIENT: &str =
    "linear-gradient(155deg, #231746 0%, #141f33 48%, #0d323f 100%)";

fn shell_surface_color() -> Rgba {
    color!("rgba(13, 18, 30, 0.76)")
}

fn pane_surface_color() -> Rgba {
    color!("rgba(21, 27, 44, 0.92)")
}

fn primary_text_color() -> Rgba {
    color!("#f1f4ff")
}

fn muted_text_color() -> Rgba {
    color!("rgba(226, 232, 255, 0.7)")
}

fn main() {
    browser::init_logger(log::LevelFilter::Info);
    start_app("app", Playground::new);
}

/// Reactive mirror of the controller state the page renders.
#[derive(Clone, Default)]
struct View {
    texts: [Mutable<String>; 3],
    line_numbers: [Mutable<String>; 3],
    auto_run: Mutable<bool>,
    notification: Mutable<Option<Notification>>,
}

impl View {
    fn sync(&self, controller: &BrowserController) {
        let state = controller.state();
        for pane in Pane::ALL {
            let slot = pane_slot(pane);
            self.texts[slot].set_neq(state.text(pane).to_owned());
            self.line_numbers[slot].set_neq(state.line_numbers(pane).to_owned());
        }
        self.auto_run.set_neq(state.auto_run());
        self.notification.set_neq(controller.notification().cloned());
    }
}

fn pane_slot(pane: Pane) -> usize {
    match pane {
        Pane::Html => 0,
        Pane::Css => 1,
        Pane::Js => 2,
    }
}

#[derive(Clone)]
struct Playground {
    controller: Rc<RefCell<BrowserController>>,
    view: View,
    surface: IframeSurface,
    editors: [Mutable<Option<HtmlTextAreaElement>>; 3],
    _timers_task: Rc<TaskHandle>,
}

impl Playground {
    fn new() -> impl Element {
        let surface = IframeSurface::new();
        let (clock, fired_jobs) = BrowserClock::channel();
        let controller = Rc::new(RefCell::new(BrowserController::new(
            LocalStorage,
            surface.clone(),
            clock,
            PlaygroundConfig::default(),
        )));
        let view = View::default();
        view.sync(&controller.borrow());

        let _timers_task = Rc::new(browser::drive_timers(fired_jobs, {
            let controller = controller.clone();
            let view = view.clone();
            move |job| {
                let mut controller = controller.borrow_mut();
                controller.fire(job);
                view.sync(&controller);
            }
        }));

        Self {
            controller,
            view,
            surface,
            editors: Default::default(),
            _timers_task,
        }
        .root()
    }

    /// Runs `action` on the controller and republishes its state.
    fn update(&self, action: impl FnOnce(&mut BrowserController)) {
        let mut controller = self.controller.borrow_mut();
        action(&mut controller);
        self.view.sync(&controller);
    }

    fn focused_pane(&self) -> Option<PaneFocus> {
        let active = web_sys::window()?.document()?.active_element()?;
        Pane::ALL.into_iter().find_map(|pane| {
            let editor = self.editors[pane_slot(pane)].lock_ref().clone()?;
            if !editor.is_same_node(Some(&*active)) {
                return None;
            }
            let value = editor.value();
            let start = editor.selection_start().ok().flatten().unwrap_or(0) as usize;
            let end = editor.selection_end().ok().flatten().unwrap_or(0) as usize;
            Some(PaneFocus {
                pane,
                selection: text_offsets::utf16_to_byte_offset(&value, start)
                    ..text_offsets::utf16_to_byte_offset(&value, end),
            })
        })
    }

    fn on_key_down(&self, event: &events::KeyDown) {
        let press = KeyPress {
            key: event.key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            shift: event.shift_key(),
            alt: event.alt_key(),
            repeat: event.repeat(),
        };
        let focus = self.focused_pane();
        let focused = focus.as_ref().map(|focus| focus.pane);

        let mut controller = self.controller.borrow_mut();
        let outcome = controller.handle_key(&press, focus);
        if outcome.prevent_default {
            event.prevent_default();
        }
        if let (Some(pane), Some(caret)) = (focused, outcome.caret) {
            let content = controller.state().text(pane).to_owned();
            if let Some(editor) = self.editors[pane_slot(pane)].lock_ref().as_ref() {
                editor.set_value(&content);
                let caret = text_offsets::byte_to_utf16_offset(&content, caret) as u32;
                if let Err(error) = editor.set_selection_range(caret, caret) {
                    log::warn!("Failed to move caret: {error:?}");
                }
            }
        }
        self.view.sync(&controller);
    }

    fn root(&self) -> impl Element + use<> {
        Stack::new()
            .s(Width::fill())
            .s(Height::fill())
            .layer(
                El::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .update_raw_el(|raw_el| raw_el.style("background", APP_BACKGROUND_GRADIENT)),
            )
            .update_raw_el({
                let this = self.clone();
                move |raw_el| {
                    raw_el.global_event_handler_with_options(
                        EventOptions::new().preventable().parents_first(),
                        move |event: events::KeyDown| this.on_key_down(&event),
                    )
                }
            })
            .layer(self.main_layout())
            .layer_signal(self.view.notification.signal_cloned().map(|notification| {
                notification.map(notification_banner)
            }))
    }

    fn main_layout(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Padding::new().x(10).y(10))
            .s(Gap::new().y(10))
            .s(Font::new().color(primary_text_color()))
            .item(self.header_bar())
            .item(
                Row::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .s(Gap::new().x(10))
                    .items(Pane::ALL.map(|pane| self.editor_pane(pane))),
            )
            .item(self.preview_panel())
    }

    fn header_bar(&self) -> impl Element + use<> {
        Row::new()
            .s(Width::fill())
            .s(Align::new().center_y())
            .s(Gap::new().x(10).y(6))
            .s(Padding::new().x(18).y(12))
            .s(RoundedCorners::all(28))
            .s(Background::new().color(shell_surface_color()))
            .multiline()
            .item(
                El::new()
                    .s(Font::new().size(18).weight(FontWeight::SemiBold).no_wrap())
                    .child("minipen"),
            )
            .item(self.action_button("Run", "Ctrl + R", |controller| {
                let _ = controller.run();
            }))
            .item(self.action_button("Save", "Ctrl + S", |controller| {
                let _ = controller.save();
            }))
            .item(self.action_button("Load", "Ctrl + L", |controller| {
                let _ = controller.load();
            }))
            .item(self.action_button("Clear", "", |controller| {
                controller.clear(&mut browser::confirm_dialog);
            }))
            .item(self.auto_run_toggle())
    }

    fn action_button<F>(
        &self,
        label: &'static str,
        hint: &'static str,
        action: F,
    ) -> impl Element + use<F>
    where
        F: Fn(&mut BrowserController) + 'static,
    {
        let hovered = Mutable::new(false);
        Button::new()
            .s(Padding::new().x(14).y(7))
            .s(RoundedCorners::all(22))
            .s(Font::new().color(color!("#052039")).weight(FontWeight::SemiBold))
            .s(Background::new().color_signal(hovered.signal().map_bool(
                || color!("rgba(140, 196, 255, 0.9)"),
                || color!("rgba(108, 162, 255, 0.75)"),
            )))
            .label(
                Row::new()
                    .s(Align::new().center_y())
                    .s(Gap::new().x(6))
                    .item(El::new().s(Font::new().size(14).no_wrap()).child(label))
                    .item(
                        El::new()
                            .s(Font::new().size(12).color(color!("rgba(5, 32, 57, 0.7)")).no_wrap())
                            .child(hint),
                    ),
            )
            .on_hovered_change(move |is_hovered| hovered.set(is_hovered))
            .on_press({
                let this = self.clone();
                move || this.update(&action)
            })
    }

    fn auto_run_toggle(&self) -> impl Element + use<> {
        Button::new()
            .s(Padding::new().x(12).y(7))
            .s(RoundedCorners::all(22))
            .s(Font::new().size(13).color(primary_text_color()))
            .s(Background::new().color_signal(self.view.auto_run.signal().map_bool(
                || color!("rgba(60, 94, 168, 0.52)"),
                || color!("rgba(26, 36, 58, 0.32)"),
            )))
            .label(
                Row::new()
                    .s(Gap::new().x(6))
                    .item(El::new().s(Font::new().no_wrap()).child("Auto-run"))
                    .item(
                        El::new()
                            .s(Font::new().size(11).weight(FontWeight::SemiBold).no_wrap())
                            .child_signal(self.view.auto_run.signal().map_bool(|| "ON", || "OFF")),
                    ),
            )
            .on_press({
                let this = self.clone();
                move || {
                    let enabled = !this.view.auto_run.get();
                    this.update(|controller| controller.set_auto_run(enabled));
                }
            })
    }

    fn editor_pane(&self, pane: Pane) -> impl Element + use<> {
        let slot = pane_slot(pane);
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Gap::new().y(6))
            .s(Padding::new().x(10).y(10))
            .s(RoundedCorners::all(18))
            .s(Background::new().color(pane_surface_color()))
            .item(
                El::new()
                    .s(Font::new().size(13).weight(FontWeight::SemiBold).color(muted_text_color()))
                    .child(pane.label().to_uppercase()),
            )
            .item(
                Row::new()
                    .s(Width::fill())
                    .s(Height::exact(260))
                    .s(Align::new().top())
                    .item(self.line_number_gutter(slot))
                    .item(self.code_area(pane)),
            )
    }

    fn line_number_gutter(&self, slot: usize) -> impl Element + use<> {
        El::new()
            .s(Height::fill())
            .s(Padding::new().x(8).top(4))
            .s(Align::new().top())
            .s(Font::new()
                .size(13)
                .color(muted_text_color())
                .family([FontFamily::new("JetBrains Mono"), FontFamily::Monospace]))
            .update_raw_el(|raw_el| {
                raw_el
                    .style("white-space", "pre")
                    .style("text-align", "right")
                    .style("line-height", "1.5")
            })
            .child_signal(self.view.line_numbers[slot].signal_cloned())
    }

    fn code_area(&self, pane: Pane) -> impl Element + use<> {
        let slot = pane_slot(pane);
        El::new()
            .s(Width::fill())
            .s(Height::fill())
            .child(
                RawHtmlEl::new("textarea")
                    .dom_element_type::<HtmlTextAreaElement>()
                    .attr("spellcheck", "false")
                    .attr("aria-label", &format!("{} editor", pane.label()))
                    .style("width", "100%")
                    .style("height", "100%")
                    .style("resize", "none")
                    .style("border", "none")
                    .style("outline", "none")
                    .style("padding", "4px 0")
                    .style("background", "transparent")
                    .style("color", "#f1f4ff")
                    .style("font-family", "'JetBrains Mono', monospace")
                    .style("font-size", "13px")
                    .style("line-height", "1.5")
                    .style("white-space", "pre")
                    .prop_signal("value", self.view.texts[slot].signal_cloned())
                    .after_insert({
                        let editor = self.editors[slot].clone();
                        move |element| editor.set(Some(element))
                    })
                    .after_remove({
                        let editor = self.editors[slot].clone();
                        move |_| editor.set(None)
                    })
                    .event_handler({
                        let this = self.clone();
                        move |_: events::Input| {
                            let Some(value) = this.editors[slot]
                                .lock_ref()
                                .as_ref()
                                .map(HtmlTextAreaElement::value)
                            else {
                                return;
                            };
                            this.update(|controller| controller.input(pane, value));
                        }
                    }),
            )
    }

    fn preview_panel(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::exact(360))
            .s(Gap::new().y(6))
            .s(Padding::new().x(10).y(10))
            .s(RoundedCorners::all(18))
            .s(Background::new().color(pane_surface_color()))
            .item(
                Row::new()
                    .s(Width::fill())
                    .s(Align::new().center_y())
                    .item(
                        El::new()
                            .s(Font::new()
                                .size(13)
                                .weight(FontWeight::SemiBold)
                                .color(muted_text_color()))
                            .child("PREVIEW"),
                    )
                    .item(
                        El::new()
                            .s(Align::new().right())
                            .child(self.action_button("Refresh", "", |controller| {
                                let _ = controller.run();
                            })),
                    ),
            )
            .item(
                Stack::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .s(RoundedCorners::all(12))
                    .s(Clip::both())
                    .s(Background::new().color(color!("#ffffff")))
                    .layer(
                        RawHtmlEl::new("iframe")
                            .attr("title", "Preview")
                            .attr("sandbox", IFRAME_SANDBOX)
                            .style("width", "100%")
                            .style("height", "100%")
                            .style("border", "none")
                            .attr_signal("srcdoc", self.surface.srcdoc().signal_cloned().map(Some)),
                    )
                    .layer_signal(self.surface.placeholder_visible().signal().map_bool(
                        || Some(preview_placeholder()),
                        || None,
                    )),
            )
    }
}

fn preview_placeholder() -> impl Element {
    El::new()
        .s(Width::fill())
        .s(Height::fill())
        .s(Background::new().color(color!("rgba(9, 13, 24, 0.94)")))
        .child(
            El::new()
                .s(Align::new().center_x().center_y())
                .s(Font::new().size(14).color(muted_text_color()).no_wrap())
                .child("Run your code to see the preview"),
        )
}

fn notification_banner(notification: Notification) -> impl Element {
    El::new()
        .s(Align::new().top().right())
        .s(Padding::new().x(16).y(10))
        .s(Transform::new().move_down(16).move_left(16))
        .s(RoundedCorners::all(12))
        .s(Font::new().size(14).color(color!("#ffffff")).weight(FontWeight::Medium))
        .update_raw_el(|raw_el| {
            raw_el
                .style("background", notification.severity.css_background())
                .attr("role", "status")
        })
        .child(notification.message)
}
