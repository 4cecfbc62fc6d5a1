use quickcheck::{QuickCheck, TestResult};
use turtle_basic::{
    BasicError, ErrorKind, Interpreter, InterpreterConfig, MemoryStorage, RunReport, Value,
};

fn interpreter() -> Interpreter {
    Interpreter::with_storage(InterpreterConfig::default(), Box::new(MemoryStorage::new()))
}

/// Load a program, RUN it and collect everything it produced
fn run(source: &str) -> (Interpreter, RunReport) {
    let mut interp = interpreter();
    interp.load_program(source).unwrap();
    let report = interp.submit("RUN");
    (interp, report)
}

#[test]
fn test_loop_body_count_property() {
    fn property(start: i8, end: i8, step: i8) -> TestResult {
        if step == 0 {
            return TestResult::discard();
        }
        let (a, b, s) = (i32::from(start), i32::from(end), i32::from(step));
        let source = format!(
            "10 C = 0\n20 FOR I = {} TO {} STEP {}\n30 C = C + 1\n40 NEXT I\n",
            a, b, s
        );
        let (interp, report) = run(&source);
        if report.error.is_some() {
            return TestResult::failed();
        }

        // Zero-iteration loops still run the body once
        let expected = ((f64::from(b - a) / f64::from(s)).floor() + 1.0).max(1.0);
        TestResult::from_bool(interp.variables().get("C") == Value::Number(expected))
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(property as fn(i8, i8, i8) -> TestResult);
}

#[test]
fn test_three_level_nesting() {
    let source = "\
10 FOR I = 1 TO 2
20 FOR J = 1 TO 2
30 FOR K = 1 TO 2
40 N = N + 1
50 NEXT
60 NEXT
70 NEXT
80 PRINT N; \" \"; I; J; K
";
    let (interp, report) = run(source);
    assert_eq!(report.error, None);
    assert_eq!(report.output, vec!["8 333"]);
    assert_eq!(interp.for_depth(), 0);
}

#[test]
fn test_outer_next_discards_inner_frames() {
    let source = "\
10 FOR I = 1 TO 2
20 FOR J = 1 TO 5
30 FOR K = 1 TO 5
40 PRINT I; J; K
50 NEXT I
60 PRINT \"DONE\"
";
    let (interp, report) = run(source);
    assert_eq!(report.error, None);
    assert_eq!(report.output, vec!["111", "211", "DONE"]);
    assert_eq!(interp.variables().get("J"), Value::Number(1.0));
}

#[test]
fn test_inner_next_resolves_innermost_frame() {
    let mut interp = interpreter();
    interp
        .load_program("10 FOR I = 1 TO 2\n20 FOR J = 1 TO 2\n30 FOR K = 1 TO 2\n40 NEXT\n")
        .unwrap();
    interp.run();
    for _ in 0..3 {
        interp.step();
    }
    assert_eq!(interp.for_depth(), 3);

    // NEXT pops K; J and I stay active until the program falls off the end
    let step = interp.step();
    assert_eq!(step.pointer, Some(40));
    assert_eq!(interp.variables().get("K"), Value::Number(2.0));
    let step = interp.step();
    assert_eq!(step.pointer, None);
    assert_eq!(interp.variables().get("K"), Value::Number(3.0));
    assert_eq!(interp.variables().get("J"), Value::Number(1.0));
}

#[test]
fn test_fractional_step() {
    let (_, report) = run("10 FOR X = 0 TO 1 STEP 0.25\n20 PRINT X\n30 NEXT\n");
    assert_eq!(report.output, vec!["0", "0.25", "0.5", "0.75", "1"]);
}

#[test]
fn test_next_without_for_halts() {
    let (interp, report) = run("10 FD 10\n20 NEXT I\n30 FD 10\n");
    let error = report.error.unwrap();
    assert_eq!(error.line, Some(20));
    assert_eq!(error.error, BasicError::runtime("NEXT without FOR"));
    assert_eq!(error.to_string(), "?RUNTIME ERROR: NEXT without FOR IN 20");
    assert_eq!(report.deltas.len(), 1);
    assert!(!interp.is_running());
}

#[test]
fn test_goto_missing_line_stops_turtle() {
    let (interp, report) = run("10 FD 10\n20 RT 90\n30 GOTO 1000\n40 FD 10\n");
    let error = report.error.unwrap();
    assert_eq!(error.error.message(), "undefined line");
    assert_eq!(error.line, Some(30));
    assert_eq!(report.deltas.len(), 1);
    assert_eq!(interp.turtle().heading(), 90.0);
    assert_eq!(interp.turtle().position().x, 10.0);
    assert_eq!(interp.turtle().position().y, 0.0);
}

#[test]
fn test_computed_goto() {
    let (_, report) = run("10 T = 3\n20 GOTO T * 10\n30 PRINT \"A\"\n40 PRINT \"B\"\n");
    assert_eq!(report.output, vec!["A", "B"]);
}

#[test]
fn test_if_then_countdown() {
    let source = "\
10 N = 3
20 PRINT N
30 N = N - 1
40 IF N > 0 THEN 20
50 IF N = 0 THEN PRINT \"LIFTOFF\"
60 IF N <> 0 THEN PRINT \"NEVER\"
";
    let (_, report) = run(source);
    assert_eq!(report.output, vec!["3", "2", "1", "LIFTOFF"]);
}

#[test]
fn test_if_with_text_condition_is_type_error() {
    let (_, report) = run("10 A$ = \"X\"\n20 IF A$ THEN 10\n");
    let error = report.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::Type);
    assert!(error.error.is_runtime());
}

#[test]
fn test_undefined_variables_read_zero() {
    let (_, report) = run("10 PRINT NEVERSET + 1\n20 PRINT Q$\n");
    assert_eq!(report.output, vec!["1", "0"]);
}

#[test]
fn test_string_concatenation() {
    let (interp, report) = run("10 A$ = \"TUR\"\n20 B$ = A$ + \"TLE\"\n30 PRINT B$\n");
    assert_eq!(report.output, vec!["TURTLE"]);
    assert_eq!(
        interp.variables().get("b$"),
        Value::Text("TURTLE".to_string())
    );
}

#[test]
fn test_error_leaves_variables_in_place() {
    let (interp, report) = run("10 X = 5\n20 Y = X / 0\n30 X = 6\n");
    assert_eq!(report.error.unwrap().kind(), ErrorKind::Arithmetic);
    assert_eq!(interp.variables().get("X"), Value::Number(5.0));
    assert!(!interp.variables().has_variable("Y"));
}

#[test]
fn test_rerun_after_fixing_program() {
    let mut interp = interpreter();
    interp.load_program("10 PRINT 1\n20 FROB\n").unwrap();
    let report = interp.submit("RUN");
    assert_eq!(report.error.unwrap().kind(), ErrorKind::Syntax);

    interp.submit("20 PRINT 2");
    let report = interp.submit("RUN");
    assert_eq!(report.error, None);
    assert_eq!(report.output, vec!["1", "2"]);
}

#[test]
fn test_step_limit_stops_endless_loop() {
    let mut interp = Interpreter::with_storage(
        InterpreterConfig::default().with_max_steps(Some(100)),
        Box::new(MemoryStorage::new()),
    );
    interp.load_program("10 FD 1\n20 GOTO 10\n").unwrap();
    let report = interp.submit("RUN");

    assert_eq!(report.steps, 100);
    assert_eq!(report.deltas.len(), 50);
    let error = report.error.unwrap();
    assert_eq!(error.error, BasicError::runtime("step limit exceeded"));
    assert!(!interp.is_running());
}

#[test]
fn test_listing_round_trip() {
    let mut interp = interpreter();
    for line in [
        "30 NEXT I",
        "10 FOR I = 1 TO 10",
        "20 FD I * 5 : REM not a separator",
        "25 PRINT \"A, B\"; 'comment",
        "15 PEN LightBlue",
    ] {
        interp.enter_line(line);
    }
    let listing = interp.program_text();

    let mut copy = interpreter();
    copy.load_program(&listing).unwrap();
    assert_eq!(copy.program(), interp.program());
    assert_eq!(copy.list_program(), interp.list_program());
    assert_eq!(interp.list_program()[1], (15, "PEN LightBlue".to_string()));
}

#[test]
fn test_load_rejects_unnumbered_text() {
    let mut interp = interpreter();
    let err = interp.load_program("10 FD 10\nRT 90\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(interp.list_program().is_empty());
}

#[test]
fn test_save_load_through_storage() {
    let mut interp = interpreter();
    interp.submit("10 FOR I = 1 TO 3");
    interp.submit("20 PRINT I");
    interp.submit("30 NEXT");
    assert_eq!(interp.submit("SAVE \"count\"").output, vec!["SAVED count"]);

    interp.submit("NEW");
    assert_eq!(interp.submit("RUN").output, Vec::<String>::new());

    interp.submit("LOAD \"count\"");
    let report = interp.submit("RUN");
    assert_eq!(report.output, vec!["1", "2", "3"]);
    assert_eq!(interp.submit("FILES").output, vec!["count"]);
}
