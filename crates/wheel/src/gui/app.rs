use crate::gui::view;
use cycles::config::Config;
use cycles::events::WheelEvent;
use cycles::{InteractionController, WheelStyle};
use gdk4::Key;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub struct AppInit {
    pub controller: InteractionController,
    pub style: WheelStyle,
    pub scale_factor: f64,
    pub rx: async_channel::Receiver<WheelEvent>,
}

pub struct AppModel {
    pub controller: Rc<InteractionController>,
    pub style: Rc<RefCell<WheelStyle>>,
    pub scale_factor: f64,
    pub day: u32,
    pub duration: u32,
    pub phase: Option<String>,
    pub ticking: Rc<Cell<bool>>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Redraw,
    AnimationStarted,
    DayChanged { duration: u32, day: u32 },
    DurationChanged { duration: u32, day: u32 },
    PhaseTableChanged,
    ConfigReload(Box<Config>),
    StepDay(i64),
    StepDuration(i64),
}

impl From<WheelEvent> for AppMsg {
    fn from(event: WheelEvent) -> Self {
        match event {
            WheelEvent::Redraw => AppMsg::Redraw,
            WheelEvent::AnimationStarted => AppMsg::AnimationStarted,
            WheelEvent::DayChanged { duration, day } => AppMsg::DayChanged { duration, day },
            WheelEvent::DurationChanged { duration, day } => {
                AppMsg::DurationChanged { duration, day }
            }
            WheelEvent::PhaseTableChanged => AppMsg::PhaseTableChanged,
            WheelEvent::ConfigReload(config) => AppMsg::ConfigReload(config),
        }
    }
}

impl AppModel {
    /// Feeds frame clock times to the controller until its animation is done.
    fn ensure_ticking(&self) {
        if self.ticking.replace(true) {
            return;
        }
        let controller = self.controller.clone();
        let ticking = self.ticking.clone();
        self.drawing_area.add_tick_callback(move |_, clock| {
            let frame_time = Duration::from_micros(clock.frame_time().max(0) as u64);
            if controller.on_frame(frame_time) {
                glib::ControlFlow::Continue
            } else {
                ticking.set(false);
                glib::ControlFlow::Break
            }
        });
    }

    fn title(&self) -> String {
        match &self.phase {
            Some(phase) => format!("Day {} of {} · {}", self.day, self.duration, phase),
            None => format!("Day {} of {}", self.day, self.duration),
        }
    }

    /// Name of the phase holding the selected day, when the table gives one.
    fn phase_name(&self) -> Option<String> {
        let phase = self.controller.phase_for_day(self.day).ok()?;
        phase.name().map(str::to_string)
    }

    fn neighbour_duration(&self, step: i64) -> Option<u32> {
        let durations = self.controller.available_durations();
        let current = self.controller.duration();
        if step < 0 {
            durations.range(..current).next_back().copied()
        } else {
            durations.range(current + 1..).next().copied()
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Cycle"),
            set_default_size: (520, 380),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match key {
                        Key::Right | Key::Down => sender.input(AppMsg::StepDay(1)),
                        Key::Left | Key::Up => sender.input(AppMsg::StepDay(-1)),
                        Key::plus | Key::KP_Add => sender.input(AppMsg::StepDuration(1)),
                        Key::minus | Key::KP_Subtract => sender.input(AppMsg::StepDuration(-1)),
                        _ => return glib::Propagation::Proceed,
                    }
                    glib::Propagation::Stop
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 6,
                    set_margin_all: 6,

                    gtk::Button {
                        set_label: "−",
                        set_tooltip_text: Some("Shorter cycle"),
                        connect_clicked => AppMsg::StepDuration(-1),
                    },
                    gtk::Label {
                        set_hexpand: true,
                        #[watch]
                        set_label: &model.title(),
                    },
                    gtk::Button {
                        set_label: "+",
                        set_tooltip_text: Some("Longer cycle"),
                        connect_clicked => AppMsg::StepDuration(1),
                    },
                },

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    add_css_class: "cycle-wheel",
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            controller,
            style,
            scale_factor,
            rx,
        } = init;

        let controller = Rc::new(controller);
        let model = AppModel {
            day: controller.selected_day(),
            duration: controller.duration(),
            phase: None,
            controller,
            style: Rc::new(RefCell::new(style)),
            scale_factor,
            ticking: Rc::new(Cell::new(false)),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.phase = model.phase_name();

        let (controller, style) = (model.controller.clone(), model.style.clone());
        widgets
            .drawing_area
            .set_draw_func(move |_, cr, _, _| {
                if let Err(e) = view::draw(cr, &controller.snapshot(), &style.borrow()) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let controller = model.controller.clone();
        widgets.drawing_area.connect_resize(move |_, width, height| {
            controller.on_size_changed(f64::from(width), f64::from(height));
        });

        let drag = gtk::GestureDrag::new();
        let controller = model.controller.clone();
        drag.connect_drag_begin(move |gesture, x, y| {
            // only claim presses on the handle so the window keeps everything else
            let state = if controller.on_pointer_down(x, y) {
                gtk::EventSequenceState::Claimed
            } else {
                gtk::EventSequenceState::Denied
            };
            gesture.set_state(state);
        });
        let controller = model.controller.clone();
        drag.connect_drag_update(move |gesture, dx, dy| {
            if let Some((x, y)) = gesture.start_point() {
                controller.on_pointer_move(x + dx, y + dy);
            }
        });
        let controller = model.controller.clone();
        drag.connect_drag_end(move |_, _, _| {
            controller.on_pointer_up();
        });
        widgets.drawing_area.add_controller(drag);

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Redraw => self.drawing_area.queue_draw(),
            AppMsg::AnimationStarted => {
                self.ensure_ticking();
                self.drawing_area.queue_draw();
            }
            AppMsg::DayChanged { duration, day } => {
                log::debug!("Day {} of {}", day, duration);
                self.day = day;
                self.duration = duration;
                self.phase = self.phase_name();
            }
            AppMsg::DurationChanged { duration, day } => {
                log::info!("Cycle length is now {} days", duration);
                self.day = day;
                self.duration = duration;
                self.phase = self.phase_name();
            }
            AppMsg::PhaseTableChanged => {
                self.controller.on_phase_table_changed();
                self.phase = self.phase_name();
                self.drawing_area.queue_draw();
            }
            AppMsg::StepDay(step) => {
                let day = i64::from(self.controller.selected_day()) + step;
                if let Ok(day) = u32::try_from(day)
                    && let Err(e) = self.controller.select_day(day)
                {
                    log::debug!("Not stepping: {}", e);
                }
            }
            AppMsg::StepDuration(step) => {
                if let Some(duration) = self.neighbour_duration(step)
                    && let Err(e) = self.controller.resize_to(duration, true)
                {
                    log::error!("Failed to resize to {} days: {}", duration, e);
                }
            }
            AppMsg::ConfigReload(new_config) => {
                if let Err(e) = new_config.apply_phases(self.controller.table()) {
                    log::error!("Ignoring phase table: {}", e);
                }
                self.controller
                    .apply_style(&new_config.style, self.scale_factor);
                *self.style.borrow_mut() = new_config.style;
                self.drawing_area.queue_draw();
                log::info!("Configuration reloaded");
            }
        }
    }
}
