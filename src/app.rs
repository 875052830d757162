use crate::animation::{LoaderAnimation, ProgressAnimation};
use crate::speedtest::Metrics;
use crate::ui::image::DecorativeImage;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PLACEHOLDER: &str = "-- --";
pub const TRIGGER_IDLE_LABEL: &str = "Test Speed";
pub const TRIGGER_BUSY_LABEL: &str = "Testing...";

// Cosmetic bar scaling: a longer bar reads as a better result.
pub const DOWNLOAD_BAR_SCALE: f64 = 0.8;
pub const UPLOAD_BAR_SCALE: f64 = 1.2;
pub const PING_BAR_PENALTY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestRun {
    pub status: RunStatus,
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
    pub ping_ms: Option<f64>,
    pub error_message: Option<String>,
}

impl TestRun {
    pub fn idle() -> Self {
        Self::with_status(RunStatus::Idle)
    }

    fn with_status(status: RunStatus) -> Self {
        Self {
            status,
            download_mbps: None,
            upload_mbps: None,
            ping_ms: None,
            error_message: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}

/// Worker stages announced before each measurement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocatingServer,
    Download,
    Upload,
}

impl Stage {
    pub fn status_text(self) -> &'static str {
        match self {
            Stage::LocatingServer => "Finding best server...",
            Stage::Download => "Testing download speed...",
            Stage::Upload => "Testing upload speed...",
        }
    }
}

/// Everything the worker may tell the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    Started,
    Stage(Stage),
    Succeeded(Metrics),
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Active,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLabel {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLabel {
    fn set(&mut self, text: &str, tone: StatusTone) {
        self.text = text.to_string();
        self.tone = tone;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDisplay {
    pub title: &'static str,
    pub value: String,
    pub bar: ProgressAnimation,
}

impl MetricDisplay {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            value: PLACEHOLDER.to_string(),
            bar: ProgressAnimation::default(),
        }
    }

    fn clear(&mut self) {
        self.value = PLACEHOLDER.to_string();
        self.bar.reset();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerButton {
    pub enabled: bool,
    pub label: &'static str,
}

impl TriggerButton {
    fn enable(&mut self) {
        self.enabled = true;
        self.label = TRIGGER_IDLE_LABEL;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.label = TRIGGER_BUSY_LABEL;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDialog {
    pub title: &'static str,
    pub message: String,
}

/// Named handles for every piece of the window, built once at startup.
pub struct Widgets {
    pub status: StatusLabel,
    pub download: MetricDisplay,
    pub upload: MetricDisplay,
    pub ping: MetricDisplay,
    pub trigger: TriggerButton,
    pub loader: LoaderAnimation,
    pub image: Option<DecorativeImage>,
}

impl Widgets {
    pub fn new(image: Option<DecorativeImage>) -> Self {
        Self {
            status: StatusLabel {
                text: "Press Enter to begin".to_string(),
                tone: StatusTone::Neutral,
            },
            download: MetricDisplay::new("Download Speed"),
            upload: MetricDisplay::new("Upload Speed"),
            ping: MetricDisplay::new("Ping"),
            trigger: TriggerButton {
                enabled: true,
                label: TRIGGER_IDLE_LABEL,
            },
            loader: LoaderAnimation::default(),
            image,
        }
    }

    fn metrics_mut(&mut self) -> [&mut MetricDisplay; 3] {
        [&mut self.download, &mut self.upload, &mut self.ping]
    }
}

pub fn download_bar_target(mbps: f64) -> f64 {
    (mbps * DOWNLOAD_BAR_SCALE).clamp(0.0, 100.0)
}

pub fn upload_bar_target(mbps: f64) -> f64 {
    (mbps * UPLOAD_BAR_SCALE).clamp(0.0, 100.0)
}

pub fn ping_bar_target(ms: f64) -> f64 {
    (100.0 - ms * PING_BAR_PENALTY).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    StartTest,
}

pub struct App {
    pub run: TestRun,
    /// Bumped by every run; stamps the bar animations that run starts.
    pub generation: u64,
    pub widgets: Widgets,
    pub dialog: Option<ErrorDialog>,
    pub should_quit: bool,
}

impl App {
    pub fn new(image: Option<DecorativeImage>) -> Self {
        Self {
            run: TestRun::idle(),
            generation: 0,
            widgets: Widgets::new(image),
            dialog: None,
            should_quit: false,
        }
    }

    pub fn handle_key_event(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(AppAction::Quit);
        }

        // The error dialog is modal.
        if self.dialog.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.dialog = None;
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Some(AppAction::Quit)
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('t') => {
                if self.widgets.trigger.enabled {
                    Some(AppAction::StartTest)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Enter the running state. Returns false, changing nothing, if a run is
    /// already in progress.
    pub fn start_test(&mut self) -> bool {
        if self.run.is_running() {
            debug!("start ignored: a test is already running");
            return false;
        }

        self.run = TestRun::with_status(RunStatus::Running);
        self.generation += 1;
        self.widgets.trigger.disable();
        self.widgets
            .status
            .set("Initializing speed test...", StatusTone::Active);
        for metric in self.widgets.metrics_mut() {
            metric.clear();
        }
        self.widgets.loader.start();

        info!("speed test started");
        true
    }

    pub fn handle_event(&mut self, event: TestEvent) {
        if !self.run.is_running() {
            warn!("dropping {:?}: no test is running", event);
            return;
        }

        match event {
            TestEvent::Started => debug!("worker started"),
            TestEvent::Stage(stage) => {
                self.widgets.status.set(stage.status_text(), StatusTone::Active);
            }
            TestEvent::Succeeded(metrics) => self.on_success(metrics),
            TestEvent::Failed { message } => self.on_failure(message),
        }
    }

    fn on_success(&mut self, metrics: Metrics) {
        let Metrics {
            download_mbps,
            upload_mbps,
            ping_ms,
        } = metrics;

        let generation = self.generation;
        let w = &mut self.widgets;
        w.download.value = format!("{:.2} Mbps", download_mbps);
        w.upload.value = format!("{:.2} Mbps", upload_mbps);
        w.ping.value = format!("{:.2} ms", ping_ms);

        w.download
            .bar
            .animate_to(download_bar_target(download_mbps), generation);
        w.upload.bar.animate_to(upload_bar_target(upload_mbps), generation);
        w.ping.bar.animate_to(ping_bar_target(ping_ms), generation);

        w.status.set("Test completed successfully", StatusTone::Success);
        w.trigger.enable();
        w.loader.stop();

        self.run.status = RunStatus::Succeeded;
        self.run.download_mbps = Some(download_mbps);
        self.run.upload_mbps = Some(upload_mbps);
        self.run.ping_ms = Some(ping_ms);

        info!(
            "speed test finished: down {:.2} Mbps, up {:.2} Mbps, ping {:.2} ms",
            download_mbps, upload_mbps, ping_ms
        );
    }

    fn on_failure(&mut self, message: String) {
        let w = &mut self.widgets;
        w.loader.stop();
        w.status
            .set("Test failed - Check your connection", StatusTone::Error);
        w.trigger.enable();

        self.dialog = Some(ErrorDialog {
            title: "Speed Test Error",
            message: format!(
                "An error occurred:\n{}\n\nPlease check your internet connection.",
                message
            ),
        });

        self.run.status = RunStatus::Failed;
        self.run.error_message = Some(message);
    }

    /// Advance every animation by one frame.
    pub fn tick(&mut self) {
        let generation = self.generation;
        self.widgets.loader.tick();
        for metric in self.widgets.metrics_mut() {
            metric.bar.tick(generation);
        }
    }
}

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
