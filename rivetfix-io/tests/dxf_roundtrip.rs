use std::fs;

use rivetfix_core::document::Entity;
use rivetfix_core::geometry::Point2;
use rivetfix_engine::correction::CorrectionConfig;
use rivetfix_engine::pass::{apply_corrections, run_pass};
use rivetfix_io::{DocumentLoader, DocumentSaver, DxfDrawing, DxfFacade, IoError};

/// 100 x 60 的矩形轮廓，一个边距 30 的铆钉孔，一个边距 10 的铆钉孔，
/// 一个 Ø6 的非铆钉孔，以及图纸空间中的一条线和一个圆。
fn sample_dxf(eol: &str) -> String {
    let lines = [
        "  0", "SECTION", "  2", "HEADER", "  9", "$ACADVER", "  1", "AC1015", "  0", "ENDSEC",
        "  0", "SECTION", "  2", "ENTITIES",
        "  0", "LINE", "  8", "CONTOUR", " 10", "0.0", " 20", "0.0", " 30", "0.0", " 11", "100.0", " 21", "0.0", " 31", "0.0",
        "  0", "LINE", "  8", "CONTOUR", " 10", "100.0", " 20", "0.0", " 11", "100.0", " 21", "60.0",
        "  0", "LINE", "  8", "CONTOUR", " 10", "100.0", " 20", "60.0", " 11", "0.0", " 21", "60.0",
        "  0", "LINE", "  8", "CONTOUR", " 10", "0.0", " 20", "60.0", " 11", "0.0", " 21", "0.0",
        "  0", "CIRCLE", "  8", "RIVETS", " 10", "50.00", " 20", "30.0", " 30", "2.5", " 40", "2.1",
        "  0", "CIRCLE", "  8", "RIVETS", " 10", "10.0", " 20", "25.0", " 30", "0.0", " 40", "2.1",
        "  0", "CIRCLE", "  8", "HOLES", " 10", "50.0", " 20", "12.0", " 30", "0.0", " 40", "3.0",
        "  0", "LINE", " 67", "1", "  8", "VIEWPORT", " 10", "50.0", " 20", "31.0", " 11", "60.0", " 21", "31.0",
        "  0", "CIRCLE", " 67", "1", "  8", "VIEWPORT", " 10", "5.0", " 20", "5.0", " 40", "2.1",
        "  0", "ENDSEC",
        "  0", "EOF",
    ];
    let mut out = lines.join(eol);
    out.push_str(eol);
    out
}

#[test]
fn parse_collects_model_space_lines_and_circles() {
    let drawing = DxfDrawing::parse(&sample_dxf("\n")).expect("parse sample");
    let document = drawing.document();

    assert_eq!(document.edges().len(), 4);
    assert_eq!(document.circle_count(), 3);

    let (_, first) = document.circles().next().expect("first circle");
    assert_eq!(first.layer, "RIVETS");
    assert!((first.center.x() - 50.0).abs() < 1e-12);
    assert!((first.center.z() - 2.5).abs() < 1e-12);
    assert!((first.diameter() - 4.2).abs() < 1e-12);

    assert!(document.entities().all(|(_, entity)| entity.layer_name() != "VIEWPORT"));
}

#[test]
fn unmodified_drawing_round_trips_byte_for_byte() {
    for eol in ["\n", "\r\n"] {
        let source = sample_dxf(eol);
        let drawing = DxfDrawing::parse(&source).expect("parse sample");
        assert_eq!(drawing.moved_circles(), 0);
        assert_eq!(drawing.to_dxf_string(), source);
    }
}

#[test]
fn corrected_circle_only_changes_its_center_values() {
    let source = sample_dxf("\r\n");
    let mut drawing = DxfDrawing::parse(&source).expect("parse sample");

    let config = CorrectionConfig::default();
    let report = run_pass(drawing.document(), &config);
    assert_eq!(report.counters.corrected, 1);
    assert_eq!(report.counters.ok, 1);
    assert_eq!(report.counters.ignored, 1);
    assert_eq!(apply_corrections(drawing.document_mut(), &report), 1);
    assert_eq!(drawing.moved_circles(), 1);

    let saved = drawing.to_dxf_string();
    // 孔 (50, 30) 距上下边均为 30，先扫描到的底边胜出，孔向底边移动 20。
    let expected = source.replacen(" 20\r\n30.0\r\n", " 20\r\n10.0\r\n", 1);
    assert_eq!(saved, expected);

    let reloaded = DxfDrawing::parse(&saved).expect("parse saved");
    let (_, moved) = reloaded.document().circles().next().expect("first circle");
    assert!((moved.center.y() - 10.0).abs() < 1e-12);
    assert!((moved.center.z() - 2.5).abs() < 1e-12);

    let second = run_pass(reloaded.document(), &config);
    assert_eq!(second.counters.corrected, 0);
    assert_eq!(second.counters.ok, 2);
}

#[test]
fn mirrored_circle_is_read_and_written_in_its_own_coordinates() {
    let source = [
        "  0", "SECTION", "  2", "ENTITIES",
        "  0", "LINE", " 10", "0.0", " 20", "0.0", " 11", "0.0", " 21", "100.0",
        "  0", "CIRCLE", " 10", "-30.0", " 20", "50.0", " 40", "2.1",
        "210", "0.0", "220", "0.0", "230", "-1.0",
        "  0", "ENDSEC", "  0", "EOF", "",
    ]
    .join("\n");

    let mut drawing = DxfDrawing::parse(&source).expect("parse mirrored");
    let (id, circle) = drawing.document().circles().next().expect("circle");
    assert!((circle.center.x() - 30.0).abs() < 1e-12);

    drawing.document_mut().move_circle(id, Point2::new(10.0, 50.0));
    let saved = drawing.to_dxf_string();
    assert!(saved.contains(" 10\n-10.0\n"));
    assert!(saved.contains(" 20\n50.0\n"));
}

#[test]
fn save_and_load_through_facade() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("part.DXF");
    fs::write(&input, sample_dxf("\n")).expect("write sample");

    let facade = DxfFacade::new();
    let mut drawing = facade.load(&input).expect("load");
    let first_id = drawing
        .document()
        .circles()
        .next()
        .map(|(id, _)| id)
        .expect("circle");
    drawing
        .document_mut()
        .move_circle(first_id, Point2::new(50.0, 10.0));

    let output = dir.path().join("part_fixed.DXF");
    facade.save(&drawing, &output).expect("save");

    let reloaded = facade.load(&output).expect("reload");
    let centers: Vec<_> = reloaded
        .document()
        .entities()
        .filter_map(|(_, entity)| match entity {
            Entity::Circle(circle) => Some(circle.center.xy()),
            _ => None,
        })
        .collect();
    assert_eq!(centers[0], Point2::new(50.0, 10.0));
    assert_eq!(centers[1], Point2::new(10.0, 25.0));
}

#[test]
fn windows_1252_drawing_keeps_its_encoding() {
    let source = sample_dxf("\r\n").replace("RIVETS", "RIVETS_PERÇAGE");
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&source);
    let bytes = bytes.into_owned();
    assert!(std::str::from_utf8(&bytes).is_err());

    let drawing = DxfDrawing::from_bytes(&bytes).expect("parse cp1252");
    assert_eq!(drawing.encoding(), encoding_rs::WINDOWS_1252);
    let (_, circle) = drawing.document().circles().next().expect("circle");
    assert_eq!(circle.layer, "RIVETS_PERÇAGE");
    assert_eq!(drawing.to_bytes(), bytes);
}

#[test]
fn binary_dxf_is_unsupported() {
    let err = DxfDrawing::from_bytes(b"AutoCAD Binary DXF\r\n\x1a\x00").unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFeature(_)));
}

#[test]
fn malformed_drawings_are_rejected() {
    let missing_radius = "  0\nSECTION\n  2\nENTITIES\n  0\nCIRCLE\n 10\n1.0\n 20\n1.0\n  0\nENDSEC\n  0\nEOF\n";
    let err = DxfDrawing::parse(missing_radius).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(_)));

    let bad_number = "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n 10\nabc\n  0\nENDSEC\n  0\nEOF\n";
    let err = DxfDrawing::parse(bad_number).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(_)));

    let unterminated = "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n";
    assert!(DxfDrawing::parse(unterminated).is_err());
}

#[test]
fn missing_file_reports_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = DxfFacade::new()
        .load(&dir.path().join("absent.dxf"))
        .unwrap_err();
    assert!(matches!(err, IoError::ReadError { .. }));
}
