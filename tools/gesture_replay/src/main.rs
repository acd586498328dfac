use std::{
    cell::RefCell,
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
    rc::Rc,
};

use gesturekit::{GestureEngine, GestureEvent, PointerEvent, SwipeDirection};

/// Extra time advanced past the last trace sample so a still-held contact
/// can reach its long-press deadline before the replay ends.
const TAIL_POLL_MS: u64 = 600;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    let events = parse_trace(&trace_path)?;
    let last_ms = events.last().map(|event| event.ms).unwrap_or(0);

    let gestures: Rc<RefCell<Vec<GestureEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let mut engine = GestureEngine::new();
    register_recorder(&mut engine, &gestures);

    for event in &events {
        engine.handle(*event);
    }
    // Captured traces often stop at the last physical sample; advance time so
    // a pending long press can still be reported.
    engine.poll(last_ms.saturating_add(TAIL_POLL_MS));

    println!("gesture,kind,args");
    for gesture in gestures.borrow().iter() {
        println!("gesture,{}", describe(gesture));
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_kinds(&expect_path)?;
        let actual: Vec<&'static str> = gestures.borrow().iter().map(kind_label).collect();
        if actual != expected {
            eprintln!("expected kinds: {}", expected.join(","));
            eprintln!("actual kinds:   {}", actual.join(","));
            return Err("gesture sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: gesture_replay <trace.csv> [--expect expected_kinds.txt]".to_string()
}

fn register_recorder(engine: &mut GestureEngine, gestures: &Rc<RefCell<Vec<GestureEvent>>>) {
    let callbacks = engine.callbacks();
    let sink = gestures.clone();
    callbacks.on_tap(move |x, y| sink.borrow_mut().push(GestureEvent::Tap { x, y }));
    let sink = gestures.clone();
    callbacks.on_double_tap(move || {
        sink.borrow_mut()
            .push(GestureEvent::DoubleTap { x: 0.0, y: 0.0 });
    });
    let sink = gestures.clone();
    callbacks.on_long_press(move |x, y, details| {
        sink.borrow_mut()
            .push(GestureEvent::LongPress { x, y, details });
    });
    let sink = gestures.clone();
    callbacks.on_long_press_end(move || sink.borrow_mut().push(GestureEvent::LongPressEnd));
    let sink = gestures.clone();
    callbacks.on_long_press_cancel(move || sink.borrow_mut().push(GestureEvent::LongPressCancel));
    let sink = gestures.clone();
    callbacks.on_swipe(move |direction, details| {
        sink.borrow_mut()
            .push(GestureEvent::Swipe { direction, details });
    });
    let sink = gestures.clone();
    callbacks.on_pinch_start(move || sink.borrow_mut().push(GestureEvent::PinchStart));
    let sink = gestures.clone();
    callbacks.on_pinch(move |scale| sink.borrow_mut().push(GestureEvent::Pinch { scale }));
    let sink = gestures.clone();
    callbacks.on_pinch_end(move || sink.borrow_mut().push(GestureEvent::PinchEnd));
}

fn parse_trace(path: &Path) -> Result<Vec<PointerEvent>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<PointerEvent> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "pointer_trace,ms,id,kind,x,y" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() < 6 {
            return Err(format!(
                "{}:{} invalid trace line, expected 6 columns",
                path.display(),
                line_no
            ));
        }
        if parts[0].trim() != "pointer_trace" {
            continue;
        }

        let ms = parse_u64(parts[1], path, line_no, "ms")?;
        let id = parse_u64(parts[2], path, line_no, "id")?;
        let kind = parts[3].trim();
        let x = parse_f32(parts[4], path, line_no, "x")?;
        let y = parse_f32(parts[5], path, line_no, "y")?;

        let event = match kind {
            "start" => PointerEvent::start(id, x, y, ms),
            "move" => PointerEvent::moved(id, x, y, ms),
            "end" => PointerEvent::end(id, x, y, ms),
            "cancel" => PointerEvent::cancel(id, x, y, ms),
            other => {
                return Err(format!(
                    "{}:{} invalid event kind: {}",
                    path.display(),
                    line_no,
                    other
                ));
            }
        };
        out.push(event);
    }

    Ok(out)
}

fn parse_expected_kinds(path: &Path) -> Result<Vec<&'static str>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut kinds = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let normalized = normalize_kind(token).ok_or_else(|| {
            format!(
                "{}:{} invalid expected gesture kind: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        kinds.push(normalized);
    }

    Ok(kinds)
}

fn normalize_kind(kind: &str) -> Option<&'static str> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "tap" => Some("tap"),
        "double_tap" => Some("double_tap"),
        "long_press" => Some("long_press"),
        "long_press_end" => Some("long_press_end"),
        "long_press_cancel" => Some("long_press_cancel"),
        "swipe_left" => Some("swipe_left"),
        "swipe_right" => Some("swipe_right"),
        "swipe_up" => Some("swipe_up"),
        "swipe_down" => Some("swipe_down"),
        "pinch_start" => Some("pinch_start"),
        "pinch" => Some("pinch"),
        "pinch_end" => Some("pinch_end"),
        _ => None,
    }
}

fn kind_label(gesture: &GestureEvent) -> &'static str {
    match gesture {
        GestureEvent::Tap { .. } => "tap",
        GestureEvent::DoubleTap { .. } => "double_tap",
        GestureEvent::LongPress { .. } => "long_press",
        GestureEvent::LongPressEnd => "long_press_end",
        GestureEvent::LongPressCancel => "long_press_cancel",
        GestureEvent::Swipe { direction, .. } => match direction {
            SwipeDirection::Left => "swipe_left",
            SwipeDirection::Right => "swipe_right",
            SwipeDirection::Up => "swipe_up",
            SwipeDirection::Down => "swipe_down",
        },
        GestureEvent::PinchStart => "pinch_start",
        GestureEvent::Pinch { .. } => "pinch",
        GestureEvent::PinchEnd => "pinch_end",
    }
}

fn describe(gesture: &GestureEvent) -> String {
    match gesture {
        GestureEvent::Tap { x, y } => format!("tap,{x},{y}"),
        GestureEvent::DoubleTap { .. } => "double_tap".to_string(),
        GestureEvent::LongPress { x, y, details } => {
            format!("long_press,{x},{y},{}", details.duration_ms)
        }
        GestureEvent::LongPressEnd => "long_press_end".to_string(),
        GestureEvent::LongPressCancel => "long_press_cancel".to_string(),
        GestureEvent::Swipe { details, .. } => format!(
            "{},{},{:.3},{}",
            kind_label(gesture),
            details.distance,
            details.velocity,
            details.duration_ms
        ),
        GestureEvent::PinchStart => "pinch_start".to_string(),
        GestureEvent::Pinch { scale } => format!("pinch,{scale:.3}"),
        GestureEvent::PinchEnd => "pinch_end".to_string(),
    }
}

fn parse_u64(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u64, String> {
    raw.trim().parse::<u64>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}

fn parse_f32(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<f32, String> {
    raw.trim().parse::<f32>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}
