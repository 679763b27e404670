// crates/pp_mesh/src/algorithms/boundary.rs

//! 边界提取
//!
//! 边界边是没有反向边的有向三角形边（单元统一为逆时针后）。边界边首尾相接构成闭合循环，
//! 面积绝对值最大的循环为外边界，其余为岛屿。
//!
//! 输出约定：
//! - 外边界逆时针，岛屿顺时针（沿边界前进时计算域在左侧）
//! - 每个循环从距其包围盒左下角最近的节点开始，距离相同取编号较小者
//! - 外边界在前，岛屿按起点 `x + y` 升序排列（相同时取编号较小者）

use std::collections::{HashMap, HashSet};

use crate::error::{MeshError, MeshResult};
use crate::mesh::TriMesh;

/// 边界循环
#[derive(Debug, Clone)]
pub struct BoundaryLoop {
    /// 边界节点索引 (有序, 首尾不重复)
    pub nodes: Vec<usize>,
    /// 是否为外边界
    pub is_outer: bool,
    /// 周长
    pub perimeter: f64,
    /// 有符号面积，逆时针为正
    pub area: f64,
    /// 包围盒
    pub bbox: BoundingBox2D,
}

impl BoundaryLoop {
    fn new(nodes: Vec<usize>, coords: &[[f64; 2]]) -> Self {
        let mut boundary_loop = Self {
            nodes,
            is_outer: false,
            perimeter: 0.0,
            area: 0.0,
            bbox: BoundingBox2D::default(),
        };
        boundary_loop.compute_geometry(coords);
        boundary_loop
    }

    fn compute_geometry(&mut self, coords: &[[f64; 2]]) {
        let n = self.nodes.len();
        self.perimeter = 0.0;
        self.area = 0.0;
        for i in 0..n {
            let a = coords[self.nodes[i]];
            let b = coords[self.nodes[(i + 1) % n]];
            self.perimeter += ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
            self.area += a[0] * b[1] - b[0] * a[1];
        }
        self.area /= 2.0;
        self.bbox = BoundingBox2D::from_points(self.nodes.iter().map(|&v| coords[v]));
    }

    /// 节点数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 是否逆时针
    pub fn is_counter_clockwise(&self) -> bool {
        self.area > 0.0
    }

    fn reverse(&mut self) {
        self.nodes.reverse();
        self.area = -self.area;
    }

    /// 旋转循环，使其从距包围盒左下角最近的节点开始
    fn rotate_to_lower_left(&mut self, coords: &[[f64; 2]]) {
        let corner = self.bbox.min;
        let dist = |v: usize| {
            let p = coords[v];
            (p[0] - corner[0]).powi(2) + (p[1] - corner[1]).powi(2)
        };
        let start = (0..self.nodes.len()).min_by(|&i, &j| {
            let (a, b) = (self.nodes[i], self.nodes[j]);
            dist(a).total_cmp(&dist(b)).then(a.cmp(&b))
        });
        if let Some(start) = start {
            self.nodes.rotate_left(start);
        }
    }
}

/// 2D 包围盒
#[derive(Debug, Clone, Default)]
pub struct BoundingBox2D {
    /// 最小坐标
    pub min: [f64; 2],
    /// 最大坐标
    pub max: [f64; 2],
}

impl BoundingBox2D {
    fn from_points(points: impl Iterator<Item = [f64; 2]>) -> Self {
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        let mut any = false;
        for p in points {
            any = true;
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        if any {
            Self { min, max }
        } else {
            Self::default()
        }
    }

    /// 宽度
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    /// 高度
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

/// 边界提取器
pub struct BoundaryExtractor;

impl BoundaryExtractor {
    /// 从三角网格提取有序边界循环
    pub fn extract(mesh: &TriMesh) -> MeshResult<Vec<BoundaryLoop>> {
        Self::extract_from_triangles(&mesh.triangles, &mesh.coords())
    }

    /// 从三角形与节点坐标提取有序边界循环
    pub fn extract_from_triangles(
        triangles: &[[usize; 3]],
        coords: &[[f64; 2]],
    ) -> MeshResult<Vec<BoundaryLoop>> {
        let edges = Self::boundary_edges(triangles, coords)?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }

        let mut loops: Vec<BoundaryLoop> = Self::chain_edges(edges)?
            .into_iter()
            .map(|nodes| BoundaryLoop::new(nodes, coords))
            .collect();

        // 面积绝对值最大者为外边界
        let outer_idx = loops
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.area.abs().total_cmp(&b.area.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0);

        for (i, l) in loops.iter_mut().enumerate() {
            l.is_outer = i == outer_idx;
            if l.is_outer != l.is_counter_clockwise() {
                l.reverse();
            }
            l.rotate_to_lower_left(coords);
        }

        let outer = loops.swap_remove(outer_idx);
        let start_key = |l: &BoundaryLoop| {
            let p = coords[l.nodes[0]];
            (p[0] + p[1], l.nodes[0])
        };
        loops.sort_by(|a, b| {
            let (ka, kb) = (start_key(a), start_key(b));
            ka.0.total_cmp(&kb.0).then(ka.1.cmp(&kb.1))
        });
        loops.insert(0, outer);

        log::debug!(
            "提取到 {} 个边界循环 (外边界 {} 节点, {} 个岛屿)",
            loops.len(),
            loops[0].len(),
            loops.len() - 1
        );
        Ok(loops)
    }

    /// 收集边界有向边（单元先统一为逆时针）
    ///
    /// 同一有向边出现两次说明网格不一致，返回错误。
    pub fn boundary_edges(
        triangles: &[[usize; 3]],
        coords: &[[f64; 2]],
    ) -> MeshResult<Vec<(usize, usize)>> {
        let mut directed: HashSet<(usize, usize)> = HashSet::with_capacity(triangles.len() * 3);
        let mut ordered = Vec::with_capacity(triangles.len() * 3);

        for (element, tri) in triangles.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&v| v >= coords.len()) {
                return Err(MeshError::invalid_topology(
                    "boundary_edges",
                    format!("单元 {} 引用节点 {} 超出 0..{}", element, bad, coords.len()),
                ));
            }
            let [a, b, c] = *tri;
            let (pa, pb, pc) = (coords[a], coords[b], coords[c]);
            let cross = (pb[0] - pa[0]) * (pc[1] - pa[1]) - (pc[0] - pa[0]) * (pb[1] - pa[1]);
            let tri = if cross < 0.0 { [a, c, b] } else { [a, b, c] };

            for i in 0..3 {
                let edge = (tri[i], tri[(i + 1) % 3]);
                if !directed.insert(edge) {
                    return Err(MeshError::invalid_topology(
                        "boundary_edges",
                        format!("有向边 {:?} 被多个单元共享 (单元 {})", edge, element),
                    ));
                }
                ordered.push(edge);
            }
        }

        // 保持单元顺序以使结果可复现
        Ok(ordered
            .into_iter()
            .filter(|&(a, b)| !directed.contains(&(b, a)))
            .collect())
    }

    /// 将有向边首尾相接为闭合循环
    fn chain_edges(edges: Vec<(usize, usize)>) -> MeshResult<Vec<Vec<usize>>> {
        let mut next: HashMap<usize, usize> = HashMap::with_capacity(edges.len());
        for &(a, b) in &edges {
            if next.insert(a, b).is_some() {
                return Err(MeshError::invalid_topology(
                    "chain_edges",
                    format!("节点 {} 有多条出边界边 (非流形边界)", a),
                ));
            }
        }

        let mut visited: HashSet<usize> = HashSet::with_capacity(edges.len());
        let mut loops = Vec::new();

        for &(start, _) in &edges {
            if visited.contains(&start) {
                continue;
            }

            let mut nodes = vec![start];
            visited.insert(start);
            let mut current = start;
            loop {
                let Some(&n) = next.get(&current) else {
                    return Err(MeshError::invalid_topology(
                        "chain_edges",
                        format!("边界在节点 {} 处断开", current),
                    ));
                };
                if n == start {
                    break;
                }
                if !visited.insert(n) {
                    return Err(MeshError::invalid_topology(
                        "chain_edges",
                        format!("边界循环在节点 {} 处自交", n),
                    ));
                }
                nodes.push(n);
                current = n;
            }
            loops.push(nodes);
        }

        Ok(loops)
    }

    /// 按循环顺序为边界节点编号 `1..=NPTFR`，内部节点为 0
    pub fn boundary_numbering(loops: &[BoundaryLoop], n_nodes: usize) -> MeshResult<Vec<i32>> {
        let mut ipobo = vec![0i32; n_nodes];
        let mut k = 0i32;
        for l in loops {
            for &v in &l.nodes {
                let slot = ipobo.get_mut(v).ok_or_else(|| {
                    MeshError::invalid_topology(
                        "boundary_numbering",
                        format!("边界节点 {} 超出 0..{}", v, n_nodes),
                    )
                })?;
                k += 1;
                *slot = k;
            }
        }
        Ok(ipobo)
    }

    /// 按循环顺序展开的全部边界节点
    pub fn boundary_nodes(loops: &[BoundaryLoop]) -> Vec<usize> {
        loops.iter().flat_map(|l| l.nodes.iter().copied()).collect()
    }
}
