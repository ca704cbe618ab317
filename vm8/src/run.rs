use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use vm8_core::{Config, Machine, Status};
use vm8_display::Display;

use crate::keymap::keymap;

/// Host side settings that don't affect the machine itself
pub struct Options {
    /// Cycles to execute per second
    pub clock_hz: u32,
    /// Size of a screen pixel in window pixels
    pub scale: u32,
}

pub fn run(rom: &Path, config: Config, options: Options) -> Result<()> {
    let mut machine = Machine::new(config);

    // Load ROM; nothing is opened unless this succeeds
    let file = File::open(rom).with_context(|| format!("unable to open {}", rom.display()))?;
    let mut reader = BufReader::new(file);
    machine
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", rom.display()))?;
    info!("loaded {} with {:?}", rom.display(), machine.config());

    let title = rom
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vm8".to_string());

    // Get SDL2 context
    let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut display = Display::new(&sdl, &title, options.scale)?;
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / options.clock_hz.max(1);
    let mut next_cycle = Instant::now();
    let mut last_tick = Instant::now();

    // Whether or not the clock speed should be respected
    let mut fast_forward = false;
    let mut tone = false;

    'event: loop {
        // If the screen changed, render the current frame
        if let Some(frame) = machine.take_frame() {
            display.render(&frame)?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (key, keymap(key)) {
                    (_, Some(k)) => machine.key_press(k),
                    (Keycode::Space, _) => {
                        fast_forward = true;
                        display.set_status(&title, "fast forward")?;
                    }
                    (Keycode::Escape, _) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(k)) => machine.key_release(k),
                    (Keycode::Space, _) => {
                        fast_forward = false;
                        display.set_status(&title, "running")?;
                    }
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if machine.cycle() == Status::Halted {
            if let Some(frame) = machine.take_frame() {
                display.render(&frame)?;
            }
            let reason = machine
                .fault()
                .map(|fault| fault.to_string())
                .unwrap_or_else(|| "halted".to_string());
            warn!("stopping: {}", reason);
            break 'event;
        }

        let now = Instant::now();
        machine.elapse(now - last_tick);
        last_tick = now;

        if machine.tone() != tone {
            tone = machine.tone();
            debug!("tone {}", if tone { "on" } else { "off" });
        }

        // Handle timing
        next_cycle += cycle_time;
        if fast_forward || next_cycle < now {
            next_cycle = now;
        } else {
            thread::sleep(next_cycle - now);
        }
    }

    Ok(())
}
