// crates/pp_mesh/src/mesh.rs

//! 二维三角网格
//!
//! 文本格式读写与边界提取共用的最小网格表示，节点索引均为 0 基。

use pp_foundation::{ValidationError, ValidationReport, ValidationWarning};

use crate::error::{MeshError, MeshResult};

/// 面积小于此值的单元视为退化
const DEGENERATE_AREA: f64 = 1e-12;

/// 二维三角网格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// 标题（ADCIRC 首行）
    pub title: String,
    /// 节点 x 坐标
    pub x: Vec<f64>,
    /// 节点 y 坐标
    pub y: Vec<f64>,
    /// 节点高程或任意节点标量
    pub z: Vec<f64>,
    /// 三角形单元 (0 基)
    pub triangles: Vec<[usize; 3]>,
}

impl TriMesh {
    /// 创建网格并检查数组长度与索引范围
    pub fn new(
        title: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        triangles: Vec<[usize; 3]>,
    ) -> MeshResult<Self> {
        let n = x.len();
        if y.len() != n {
            return Err(MeshError::size_mismatch("y", n, y.len()));
        }
        if z.len() != n {
            return Err(MeshError::size_mismatch("z", n, z.len()));
        }
        if let Some((i, _)) = triangles
            .iter()
            .enumerate()
            .find(|(_, t)| t.iter().any(|&v| v >= n))
        {
            return Err(MeshError::invalid_topology(
                "new",
                format!("单元 {} 引用的节点超出 0..{}", i, n),
            ));
        }
        Ok(Self {
            title: title.into(),
            x,
            y,
            z,
            triangles,
        })
    }

    /// 节点数
    pub fn n_nodes(&self) -> usize {
        self.x.len()
    }

    /// 单元数
    pub fn n_elements(&self) -> usize {
        self.triangles.len()
    }

    /// 节点坐标
    pub fn coords(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }

    /// 连接表展平为 NDP = 3 的一维数组
    pub fn connectivity(&self) -> Vec<usize> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// 单元有符号面积，逆时针为正
    pub fn signed_area(&self, element: usize) -> f64 {
        let [a, b, c] = self.triangles[element];
        0.5 * ((self.x[b] - self.x[a]) * (self.y[c] - self.y[a])
            - (self.x[c] - self.x[a]) * (self.y[b] - self.y[a]))
    }

    /// 将所有顺时针单元调整为逆时针，返回调整的单元数
    pub fn orient_counter_clockwise(&mut self) -> usize {
        let mut flipped = 0;
        for i in 0..self.triangles.len() {
            if self.signed_area(i) < 0.0 {
                self.triangles[i].swap(1, 2);
                flipped += 1;
            }
        }
        flipped
    }

    /// 检查坐标、单元方向与孤立节点
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (field, values) in [("x", &self.x), ("y", &self.y), ("z", &self.z)] {
            for (node_id, &value) in values.iter().enumerate() {
                if !value.is_finite() {
                    report.add_error(ValidationError::NonFinite {
                        field,
                        node_id,
                        value,
                    });
                }
            }
        }

        let mut used = vec![false; self.n_nodes()];
        for (element_id, tri) in self.triangles.iter().enumerate() {
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                report.add_error(ValidationError::TopologyError {
                    message: format!("重复节点 {:?}", tri),
                    element_id: Some(element_id),
                });
                continue;
            }
            for &v in tri {
                used[v] = true;
            }
            let area = self.signed_area(element_id);
            if area.abs() < DEGENERATE_AREA {
                report.add_warning(ValidationWarning::DegenerateElement { element_id, area });
            } else if area < 0.0 {
                report.add_warning(ValidationWarning::ClockwiseElement { element_id });
            }
        }

        for (node_id, _) in used.iter().enumerate().filter(|(_, &u)| !u) {
            report.add_warning(ValidationWarning::OrphanNode { node_id });
        }

        report
    }
}
