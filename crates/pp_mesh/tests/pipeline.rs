// crates/pp_mesh/tests/pipeline.rs

//! ADCIRC 网格 → 边界提取 → SELAFIN/.cli 的完整流程

use pp_mesh::io::{AdcircLoader, AdcircWriter, BndFile, CliFile, PolygonKind};
use pp_mesh::BoundaryExtractor;
use pp_selafin::{SelafinConfig, SelafinHeader, SelafinReader, SelafinWriter};

/// 带一个方形岛屿的 4x4 节点网格, 单元编号故意混用顺时针与逆时针
fn grd_with_island() -> String {
    let n = 4;
    let mut nodes = Vec::new();
    for j in 0..n {
        for i in 0..n {
            nodes.push(format!("{} {}.0 {}.0 -{}.0", j * n + i + 1, i, j, i + j));
        }
    }
    let mut elems = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            if i == 1 && j == 1 {
                continue;
            }
            let a = j * n + i + 1;
            let (b, c, d) = (a + 1, a + n + 1, a + n);
            elems.push(format!("{} {} {}", a, b, c));
            elems.push(format!("{} {} {}", a, d, c));
        }
    }
    let mut text = format!("island\n{} {}\n", elems.len(), nodes.len());
    for l in &nodes {
        text.push_str(l);
        text.push('\n');
    }
    for (k, e) in elems.iter().enumerate() {
        text.push_str(&format!("{} 3 {}\n", k + 1, e));
    }
    text
}

#[test]
fn test_adcirc_to_selafin_with_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let grd = dir.path().join("island.grd");
    std::fs::write(&grd, grd_with_island()).unwrap();

    let mut mesh = AdcircLoader::load(&grd).unwrap();
    assert_eq!(mesh.n_elements(), 16);
    assert_eq!(mesh.orient_counter_clockwise(), 8);
    assert!(mesh.validate().is_valid());

    let loops = BoundaryExtractor::extract(&mesh).unwrap();
    assert_eq!(loops.len(), 2);
    let ipobo = BoundaryExtractor::boundary_numbering(&loops, mesh.n_nodes()).unwrap();

    let header = SelafinHeader::from_mesh(
        mesh.title.clone(),
        &mesh.triangles,
        mesh.x.clone(),
        mesh.y.clone(),
        ipobo.clone(),
    )
    .unwrap();

    let slf = dir.path().join("island.slf");
    let mut w = SelafinWriter::create(&slf, SelafinConfig::default()).unwrap();
    w.set_header(&header).unwrap();
    w.set_variable_names(&["BOTTOM"]).unwrap();
    w.set_variable_units(&["M"]).unwrap();
    w.write_header().unwrap();
    w.write_timestep(0.0, &[&mesh.z]).unwrap();
    w.close().unwrap();

    let mut r = SelafinReader::open(&slf).unwrap();
    assert_eq!(r.header().boundary_indicator, ipobo);
    assert_eq!(r.header().triangles().unwrap(), mesh.triangles);
    assert_eq!(r.read_variables_at(0).unwrap()[0], mesh.z);

    let cli = CliFile::land(&BoundaryExtractor::boundary_nodes(&loops));
    let cli_path = dir.path().join("island.cli");
    cli.write(&cli_path).unwrap();
    let cli_back = CliFile::load(&cli_path).unwrap();
    assert_eq!(cli_back.len(), 16);
    for (k, rec) in cli_back.records.iter().enumerate() {
        assert_eq!(ipobo[rec.node], k as i32 + 1);
    }
}

#[test]
fn test_boundary_file_roundtrip() {
    let mesh = AdcircLoader::load_from_reader(std::io::Cursor::new(grd_with_island())).unwrap();
    let loops = BoundaryExtractor::extract(&mesh).unwrap();
    let bnd = BndFile::from_loops(&loops);
    assert_eq!(bnd.polygons[0].kind, PolygonKind::Exterior);
    assert_eq!(bnd.polygons[1].kind, PolygonKind::Island);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gredit.bnd");
    bnd.write(&path).unwrap();
    assert_eq!(BndFile::load(&path).unwrap(), bnd);
}

#[test]
fn test_adcirc_file_roundtrip() {
    let mesh = AdcircLoader::load_from_reader(std::io::Cursor::new(grd_with_island())).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.grd");
    AdcircWriter::write(&path, &mesh).unwrap();
    assert_eq!(AdcircLoader::load(&path).unwrap(), mesh);
}
