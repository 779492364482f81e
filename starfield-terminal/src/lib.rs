/// Terminal front end for the star field backdrop
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseEvent,
        MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use starfield_core::{
    Camera, FrameClock, InputBus, InputEvent, PointerParallaxTracker, StarField, Viewport,
};

pub mod renderer;

pub use renderer::AsciiRenderer;

use renderer::CELL_ASPECT;

/// Sky stars added or removed per key press
const COUNT_STEP: usize = 1000;

/// Main application struct for the terminal star field
pub struct TerminalApp {
    field: StarField,
    camera: Camera,
    renderer: AsciiRenderer,
    input: InputBus,
    clock: FrameClock,
    started: Instant,
    target_fps: u32,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(field: StarField) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            field,
            camera: cell_camera(width, height),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            input: InputBus::new(),
            clock: FrameClock::new(),
            started: Instant::now(),
            target_fps: 30,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        enter_screen(&mut stdout(), terminal::disable_raw_mode)?;
        log::info!(
            "starting terminal star field at {}x{}",
            self.renderer.width(),
            self.renderer.height()
        );

        // Released when this scope ends, however the loop exits
        let tracker = self.field.track_pointer(&self.input, self.viewport());
        let result = self.main_loop(&tracker);
        drop(tracker);

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        log::info!("terminal star field stopped after {} frames", self.clock.frames());

        result
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.renderer.width() as f32, self.renderer.height() as f32)
    }

    fn main_loop(&mut self, tracker: &PointerParallaxTracker) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.target_fps as u64);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input(event::read()?)?;
            }

            // Update
            self.clock.drive(self.started.elapsed(), &mut self.field);

            // Render
            self.render(tracker)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => {
                self.input.publish(InputEvent::PointerMove {
                    client_x: column as f32,
                    client_y: row as f32,
                });
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.camera = cell_camera(width, height);
                self.input.publish(InputEvent::Resize(self.viewport()));
                execute!(stdout(), terminal::Clear(terminal::ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        let config = *self.field.config();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.field.set_count(config.count.saturating_add(COUNT_STEP));
            }
            KeyCode::Char('-') => {
                self.field.set_count(config.count.saturating_sub(COUNT_STEP));
            }
            KeyCode::Char(']') => {
                self.field
                    .set_shooting_star_count(config.shooting_star_count.saturating_add(1));
            }
            KeyCode::Char('[') => {
                self.field
                    .set_shooting_star_count(config.shooting_star_count.saturating_sub(1));
            }
            KeyCode::Char('r') => {
                self.field.reseed(self.started.elapsed().as_nanos() as u64);
            }
            _ => {}
        }
    }

    fn render(&mut self, tracker: &PointerParallaxTracker) -> io::Result<()> {
        self.field.present(&mut self.renderer);
        self.renderer.render(&self.camera);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let config = self.field.config();
        let pointer = match tracker.pointer() {
            Some(p) => format!("{:+.2},{:+.2}", p.x, p.y),
            None => "-".to_string(),
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Starfield | FPS: {:.1} | Stars: {} | Shooting: {} | Pointer: {} | +/- Stars [/] Shooting R=Reseed Q=Quit",
                self.fps, config.count, config.shooting_star_count, pointer
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Switch to the alternate screen with mouse capture, undoing raw mode if
/// that fails
fn enter_screen<W, F>(out: &mut W, restore_raw_mode: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
{
    let entered = execute!(
        out,
        terminal::EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    );
    if entered.is_err() {
        if let Err(err) = restore_raw_mode() {
            log::warn!("failed to leave raw mode: {err}");
        }
    }
    entered
}

/// Camera for a grid of terminal cells
fn cell_camera(width: u16, height: u16) -> Camera {
    let mut camera = Camera::new(width as u32, height as u32);
    camera.aspect *= CELL_ASPECT;
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_failed_setup_restores_raw_mode() {
        let restored = Cell::new(false);
        let result = enter_screen(&mut BrokenPipe, || {
            restored.set(true);
            Ok(())
        });

        assert!(result.is_err());
        assert!(restored.get());
    }

    #[test]
    fn test_successful_setup_keeps_raw_mode() {
        let restored = Cell::new(false);
        let mut out = Vec::new();
        enter_screen(&mut out, || {
            restored.set(true);
            Ok(())
        })
        .unwrap();

        assert!(!restored.get());
        assert!(!out.is_empty());
    }
}
