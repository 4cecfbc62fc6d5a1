use turtle_basic::graphics::{Canvas, Point};
use turtle_basic::{DrawCommand, ErrorKind, Interpreter, InterpreterConfig, MemoryStorage};

fn interpreter() -> Interpreter {
    Interpreter::with_storage(InterpreterConfig::default(), Box::new(MemoryStorage::new()))
}

/// Helper to execute a console line and paint its deltas
fn execute_line(interp: &mut Interpreter, canvas: &mut Canvas, line: &str) {
    let report = interp.submit(line);
    assert_eq!(report.error, None, "{}", line);
    for command in &report.deltas {
        canvas.apply(command);
    }
}

fn canvas() -> Canvas {
    let config = InterpreterConfig::default();
    Canvas::new(
        config.canvas_width as usize,
        config.canvas_height as usize,
        config.background,
    )
}

fn assert_close(actual: Point, x: f64, y: f64) {
    assert!(
        (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
        "expected ({}, {}), got {:?}",
        x,
        y,
        actual
    );
}

#[test]
fn test_forward_draws_segment() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "FD 50");

    assert_close(interp.turtle().position(), 50.0, 0.0);
    assert_eq!(canvas.color_at(25.0, 0.0), Some(1));
    assert_eq!(canvas.color_at(0.0, 25.0), Some(6));
}

#[test]
fn test_pen_up_moves_without_drawing() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "PU");
    execute_line(&mut interp, &mut canvas, "FD 80");
    assert_eq!(canvas.painted_pixels(), 0);

    execute_line(&mut interp, &mut canvas, "PD");
    execute_line(&mut interp, &mut canvas, "BK 40");
    assert_close(interp.turtle().position(), 40.0, 0.0);
    assert_eq!(canvas.color_at(60.0, 0.0), Some(1));
    assert_eq!(canvas.color_at(20.0, 0.0), Some(6));
}

#[test]
fn test_right_turn_points_down_the_screen() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "RT 90");
    execute_line(&mut interp, &mut canvas, "FD 30");
    assert_close(interp.turtle().position(), 0.0, 30.0);

    execute_line(&mut interp, &mut canvas, "LT 180");
    assert_eq!(interp.turtle().heading(), 270.0);
    execute_line(&mut interp, &mut canvas, "LT 360");
    assert_eq!(interp.turtle().heading(), 270.0);
}

#[test]
fn test_diagonal_move() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "RT 45");
    execute_line(&mut interp, &mut canvas, "FD 10");
    let expected = 10.0 / 2f64.sqrt();
    assert_close(interp.turtle().position(), expected, expected);
}

#[test]
fn test_go_absolute() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "GO 100, -50");
    assert_close(interp.turtle().position(), 100.0, -50.0);
    execute_line(&mut interp, &mut canvas, "X = 20");
    execute_line(&mut interp, &mut canvas, "GO X * 2, X");
    assert_close(interp.turtle().position(), 40.0, 20.0);
    assert_eq!(canvas.color_at(100.0, -50.0), Some(1));
}

#[test]
fn test_color_and_thickness_reach_segments() {
    let mut interp = interpreter();

    interp.submit("PEN lightblue");
    interp.submit("THICK 3");
    let report = interp.submit("FD 10");
    assert_eq!(
        report.deltas,
        vec![DrawCommand::Line {
            from: Point::ORIGIN,
            to: Point::new(10.0, 0.0),
            color: 14,
            thickness: 3,
        }]
    );
}

#[test]
fn test_unknown_color_leaves_pen_unchanged() {
    let mut interp = interpreter();

    interp.submit("PEN orange");
    let report = interp.submit("PEN mauve");
    let error = report.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::Value);
    assert_eq!(error.error.message(), "unknown color");
    assert_eq!(interp.turtle().pen_color(), 8);

    let report = interp.submit("BG 3.5");
    assert_eq!(report.error.unwrap().kind(), ErrorKind::Value);
    assert_eq!(interp.turtle().background(), 6);
}

#[test]
fn test_background_clears_canvas() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "FD 100");
    assert!(canvas.painted_pixels() > 0);

    execute_line(&mut interp, &mut canvas, "BG black");
    assert_eq!(canvas.painted_pixels(), 0);
    assert_eq!(canvas.color_at(50.0, 0.0), Some(0));
    assert_eq!(interp.turtle().background(), 0);
}

#[test]
fn test_circle_touches_turtle() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(&mut interp, &mut canvas, "PU");
    execute_line(&mut interp, &mut canvas, "CIRCLE 40");
    // Circle passes through the turtle and its centre sits on the right
    assert_eq!(canvas.color_at(0.0, 0.0), Some(1));
    assert_eq!(canvas.color_at(0.0, 80.0), Some(1));
    assert_eq!(canvas.color_at(0.0, 40.0), Some(6));
    assert_close(interp.turtle().position(), 0.0, 0.0);

    assert_eq!(interp.submit("CIRCLE 0").error.unwrap().kind(), ErrorKind::Value);
}

#[test]
fn test_square_program_closes() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    interp
        .load_program("10 FOR I=1 TO 4\n20 FD 100\n30 RT 90\n40 NEXT I\n")
        .unwrap();
    execute_line(&mut interp, &mut canvas, "RUN");

    assert_eq!(interp.turtle().heading(), 0.0);
    assert_close(interp.turtle().position(), 0.0, 0.0);
    for (x, y) in [(50.0, 0.0), (100.0, 50.0), (50.0, 100.0), (0.0, 50.0)] {
        assert_eq!(canvas.color_at(x, y), Some(1), "edge at ({}, {})", x, y);
    }
    assert_eq!(canvas.color_at(50.0, 50.0), Some(6));
}

#[test]
fn test_spiral_program() {
    let mut interp = interpreter();

    interp
        .load_program(
            "10 REM spiral\n\
             20 PEN yellow\n\
             30 FOR N = 1 TO 36\n\
             40 FD N * 3\n\
             50 RT 20\n\
             60 NEXT N\n\
             70 PU\n\
             80 GO 0 0\n",
        )
        .unwrap();
    let report = interp.submit("RUN");

    assert_eq!(report.error, None);
    assert_eq!(report.deltas.len(), 36);
    assert!(report.deltas.iter().all(|d| matches!(d, DrawCommand::Line { color: 7, .. })));
    assert_close(interp.turtle().position(), 0.0, 0.0);
    assert!(!interp.turtle().is_pen_down());
}

#[test]
fn test_run_resets_turtle() {
    let mut interp = interpreter();

    interp.submit("PEN red");
    interp.submit("RT 30");
    interp.submit("FD 10");
    interp.load_program("10 PRINT 1\n").unwrap();
    interp.submit("RUN");

    assert_eq!(interp.turtle().position(), Point::ORIGIN);
    assert_eq!(interp.turtle().heading(), 0.0);
    assert_eq!(interp.turtle().pen_color(), 1);
    assert_eq!(interp.turtle().thickness(), 2);
}

#[test]
fn test_text_preview() {
    let mut interp = interpreter();
    let mut canvas = Canvas::new(40, 20, 6);

    execute_line(&mut interp, &mut canvas, "THICK 1");
    execute_line(&mut interp, &mut canvas, "GO -20 0");
    let preview = canvas.render_text(4, 2);
    // The segment ends on the centre pixel, which belongs to column 2
    assert_eq!(preview, "....\n###.\n");
}

#[test]
fn test_enormous_moves_paint_without_hanging() {
    let mut interp = interpreter();
    let mut canvas = canvas();

    execute_line(
        &mut interp,
        &mut canvas,
        "FD 1000000000 * 1000000000 * 1000000000 * 1000000000",
    );
    execute_line(&mut interp, &mut canvas, "GO 0, 0");
    execute_line(&mut interp, &mut canvas, "RT 90");
    execute_line(&mut interp, &mut canvas, "CIRCLE 1000000000000");

    assert_eq!(canvas.color_at(100.0, 0.0), Some(1));
    // Facing down the screen, the circle's centre is far to the left and its
    // visible arc runs straight up and down through the turtle
    assert_eq!(canvas.color_at(0.0, 100.0), Some(1));
    assert_eq!(canvas.color_at(-100.0, 100.0), Some(6));
}
