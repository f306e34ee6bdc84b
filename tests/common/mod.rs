//! Workload fixtures shared by the integration tests.

use std::sync::Arc;

use fusion_affine::{Context, IslMap, IslSet};
use fusion_deps::{DependencyChain, DimensionId, StageId, TensorId};
use fusion_workload::{FusedWorkload, WorkloadBuilder};

/// Route analyzer logs through the test harness. Safe to call repeatedly.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn stage(w: &FusedWorkload, name: &str) -> StageId {
    w.stage_by_name(name)
        .unwrap_or_else(|| panic!("no stage named {name}"))
}

#[allow(dead_code)]
pub fn tensor(w: &FusedWorkload, name: &str) -> TensorId {
    w.tensor_by_name(name)
        .unwrap_or_else(|| panic!("no tensor named {name}"))
}

#[allow(dead_code)]
pub fn dim(w: &FusedWorkload, stage_name: &str, dim_name: &str) -> DimensionId {
    w.dimension_by_name(stage(w, stage_name), dim_name)
        .unwrap_or_else(|| panic!("no dimension {stage_name}.{dim_name}"))
}

/// Builds workloads from isl text, all in one context.
pub struct Fixture {
    ctx: Arc<Context>,
    builder: WorkloadBuilder<IslMap>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(Context::alloc()),
            builder: WorkloadBuilder::new(),
        }
    }

    pub fn tensor(&mut self, name: &str, rank: usize) -> TensorId {
        self.builder.tensor(name, rank).unwrap()
    }

    /// `space` is an isl set such as `{ [i] : 0 <= i < 8 }`; its tuple
    /// variables name the stage's dimensions.
    pub fn stage<const N: usize>(&mut self, name: &str, space: &str, dims: [&str; N]) -> StageId {
        let space = IslSet::parse(&self.ctx, space);
        self.builder.stage(name, space, dims).unwrap()
    }

    pub fn read(&mut self, stage: StageId, tensor: TensorId, access: &str) {
        let access = IslMap::parse(&self.ctx, access);
        self.builder.read(stage, tensor, access).unwrap();
    }

    pub fn write(&mut self, stage: StageId, tensor: TensorId, access: &str) {
        let access = IslMap::parse(&self.ctx, access);
        self.builder.write(stage, tensor, access).unwrap();
    }

    pub fn build(self) -> FusedWorkload {
        self.builder.build().unwrap()
    }
}

/// One chain per entry, separated by `; `.
#[allow(dead_code)]
pub fn render_chains(chains: &[DependencyChain]) -> String {
    chains
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// `A[i]` writes `T[i]`; `B[j]` reads `T[j]` and writes `U[j]`.
#[allow(dead_code)]
pub fn two_stage() -> FusedWorkload {
    let mut f = Fixture::new();
    let t = f.tensor("T", 1);
    let u = f.tensor("U", 1);
    let a = f.stage("A", "{ [i] : 0 <= i < 8 }", ["i"]);
    let b = f.stage("B", "{ [j] : 0 <= j < 8 }", ["j"]);
    f.write(a, t, "{ [i] -> [i] }");
    f.read(b, t, "{ [j] -> [j] }");
    f.write(b, u, "{ [j] -> [j] }");
    f.build()
}

/// Workload input `X` has no writer and two readers:
/// `A[i]` reads `X[i]`, writes `T[i]`; `B[j]` reads `X[j]`, writes `U[j]`;
/// `C[k]` reads `T[k]`, writes `V[k]`.
#[allow(dead_code)]
pub fn shared_input() -> FusedWorkload {
    let mut f = Fixture::new();
    let x = f.tensor("X", 1);
    let t = f.tensor("T", 1);
    let u = f.tensor("U", 1);
    let v = f.tensor("V", 1);
    let a = f.stage("A", "{ [i] : 0 <= i < 8 }", ["i"]);
    let b = f.stage("B", "{ [j] : 0 <= j < 8 }", ["j"]);
    let c = f.stage("C", "{ [k] : 0 <= k < 8 }", ["k"]);
    f.read(a, x, "{ [i] -> [i] }");
    f.write(a, t, "{ [i] -> [i] }");
    f.read(b, x, "{ [j] -> [j] }");
    f.write(b, u, "{ [j] -> [j] }");
    f.read(c, t, "{ [k] -> [k] }");
    f.write(c, v, "{ [k] -> [k] }");
    f.build()
}

/// `A[i]` writes `T[i]`; `B[j]` reads `T[min(j + 1, 7)]` as two guarded
/// pieces and writes `U[j]`.
#[allow(dead_code)]
pub fn clamped_halo() -> FusedWorkload {
    let mut f = Fixture::new();
    let t = f.tensor("T", 1);
    let u = f.tensor("U", 1);
    let a = f.stage("A", "{ [i] : 0 <= i < 8 }", ["i"]);
    let b = f.stage("B", "{ [j] : 0 <= j < 8 }", ["j"]);
    f.write(a, t, "{ [i] -> [i] }");
    f.read(
        b,
        t,
        "{ [j] -> [t] : t = j + 1 and j <= 6; [j] -> [t] : t = 7 and j >= 7 }",
    );
    f.write(b, u, "{ [j] -> [j] }");
    f.build()
}

/// `A[m, k]` reads `X[m, k]` and reduces over `k` into `T[m]`;
/// `B[n]` reads `T[n]` and writes `U[n]`.
#[allow(dead_code)]
pub fn reduction() -> FusedWorkload {
    let mut f = Fixture::new();
    let x = f.tensor("X", 2);
    let t = f.tensor("T", 1);
    let u = f.tensor("U", 1);
    let a = f.stage("A", "{ [m, k] : 0 <= m < 8 and 0 <= k < 4 }", ["m", "k"]);
    let b = f.stage("B", "{ [n] : 0 <= n < 8 }", ["n"]);
    f.read(a, x, "{ [m, k] -> [m, k] }");
    f.write(a, t, "{ [m, k] -> [m] }");
    f.read(b, t, "{ [n] -> [n] }");
    f.write(b, u, "{ [n] -> [n] }");
    f.build()
}

/// `A[i]` writes `T[i]`; `B[j]` reads `T[j + 1]` and writes `U[j]`;
/// `C[k]` reads `T[2k]` and writes `V[k]`.
#[allow(dead_code)]
pub fn offsets() -> FusedWorkload {
    let mut f = Fixture::new();
    let t = f.tensor("T", 1);
    let u = f.tensor("U", 1);
    let v = f.tensor("V", 1);
    let a = f.stage("A", "{ [i] : 0 <= i < 16 }", ["i"]);
    let b = f.stage("B", "{ [j] : 0 <= j < 15 }", ["j"]);
    let c = f.stage("C", "{ [k] : 0 <= k < 8 }", ["k"]);
    f.write(a, t, "{ [i] -> [i] }");
    f.read(b, t, "{ [j] -> [j + 1] }");
    f.write(b, u, "{ [j] -> [j] }");
    f.read(c, t, "{ [k] -> [2k] }");
    f.write(c, v, "{ [k] -> [k] }");
    f.build()
}

/// `A[i, k]` reads `X[k]` and writes every other row, `T[2i, k]`;
/// `B[j, l]` reads `T[j, l]` and writes `U[j, l]`.
#[allow(dead_code)]
pub fn strided_rows() -> FusedWorkload {
    let mut f = Fixture::new();
    let x = f.tensor("X", 1);
    let t = f.tensor("T", 2);
    let u = f.tensor("U", 2);
    let a = f.stage("A", "{ [i, k] : 0 <= i < 4 and 0 <= k < 8 }", ["i", "k"]);
    let b = f.stage("B", "{ [j, l] : 0 <= j < 8 and 0 <= l < 8 }", ["j", "l"]);
    f.read(a, x, "{ [i, k] -> [k] }");
    f.write(a, t, "{ [i, k] -> [2i, k] }");
    f.read(b, t, "{ [j, l] -> [j, l] }");
    f.write(b, u, "{ [j, l] -> [j, l] }");
    f.build()
}

/// `S` feeds both `L` and `R`, which both feed `D`.
#[allow(dead_code)]
pub fn diamond() -> FusedWorkload {
    let mut f = Fixture::new();
    let s_out = f.tensor("S_out", 1);
    let l_out = f.tensor("L_out", 1);
    let r_out = f.tensor("R_out", 1);
    let d_out = f.tensor("D_out", 1);
    let s = f.stage("S", "{ [s] : 0 <= s < 8 }", ["s"]);
    let l = f.stage("L", "{ [l] : 0 <= l < 8 }", ["l"]);
    let r = f.stage("R", "{ [r] : 0 <= r < 8 }", ["r"]);
    let d = f.stage("D", "{ [d] : 0 <= d < 8 }", ["d"]);
    let identity = "{ [x] -> [x] }";
    f.write(s, s_out, identity);
    f.read(l, s_out, identity);
    f.write(l, l_out, identity);
    f.read(r, s_out, identity);
    f.write(r, r_out, identity);
    f.read(d, l_out, identity);
    f.read(d, r_out, identity);
    f.write(d, d_out, identity);
    f.build()
}
