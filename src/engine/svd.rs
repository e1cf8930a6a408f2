use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_TOL: f64 = 1e-12;
/// Eigenvalues below this fraction of the largest are treated as rank
/// deficiency and dropped
const RANK_EPS: f64 = 1e-10;

/// Rank-k truncated singular value decomposition, `A ≈ U · Σ · Vᵀ`.
///
/// Computed without an external LAPACK binding: the smaller Gram matrix
/// (`AᵀA` or `AAᵀ`) is diagonalized by cyclic Jacobi rotations, which is
/// deterministic and robust for the matrix sizes this engine sees (catalogs
/// and user bases in the hundreds to low thousands). The effective rank may
/// come out below the requested `k` when the spectrum collapses.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    pub u: Array2<f64>,
    pub sigma: Array1<f64>,
    pub vt: Array2<f64>,
}

impl TruncatedSvd {
    /// Factorizes `a` keeping at most `k` singular triples
    pub fn fit(a: &Array2<f64>, k: usize) -> Self {
        let (m, n) = a.dim();
        let k = k.min(m.min(n));
        if k == 0 || m == 0 || n == 0 {
            return Self::empty(m, n);
        }

        // Diagonalize the smaller Gram matrix and recover the other factor
        if n <= m {
            let gram = a.t().dot(a);
            let (eigvals, eigvecs) = jacobi_eigen(gram);
            let kept = top_eigenpairs(&eigvals, k);
            if kept.is_empty() {
                return Self::empty(m, n);
            }

            let rank = kept.len();
            let mut u = Array2::zeros((m, rank));
            let mut sigma = Array1::zeros(rank);
            let mut vt = Array2::zeros((rank, n));
            for (out, &(idx, eigval)) in kept.iter().enumerate() {
                let s = eigval.sqrt();
                let v = eigvecs.column(idx).to_owned();
                let av = a.dot(&v);
                u.column_mut(out).assign(&(&av / s));
                sigma[out] = s;
                vt.row_mut(out).assign(&v);
            }
            Self { u, sigma, vt }
        } else {
            let gram = a.dot(&a.t());
            let (eigvals, eigvecs) = jacobi_eigen(gram);
            let kept = top_eigenpairs(&eigvals, k);
            if kept.is_empty() {
                return Self::empty(m, n);
            }

            let rank = kept.len();
            let mut u = Array2::zeros((m, rank));
            let mut sigma = Array1::zeros(rank);
            let mut vt = Array2::zeros((rank, n));
            for (out, &(idx, eigval)) in kept.iter().enumerate() {
                let s = eigval.sqrt();
                let uc = eigvecs.column(idx).to_owned();
                let atu = a.t().dot(&uc);
                u.column_mut(out).assign(&uc);
                sigma[out] = s;
                vt.row_mut(out).assign(&(&atu / s));
            }
            Self { u, sigma, vt }
        }
    }

    /// Dense rank-k reconstruction `U · Σ · Vᵀ`
    pub fn reconstruct(&self) -> Array2<f64> {
        if self.sigma.is_empty() {
            return Array2::zeros((self.u.nrows(), self.vt.ncols()));
        }
        let mut scaled = self.u.clone();
        for (j, &s) in self.sigma.iter().enumerate() {
            scaled.column_mut(j).mapv_inplace(|v| v * s);
        }
        scaled.dot(&self.vt)
    }

    /// Number of singular triples actually retained
    pub fn rank(&self) -> usize {
        self.sigma.len()
    }

    fn empty(m: usize, n: usize) -> Self {
        Self {
            u: Array2::zeros((m, 0)),
            sigma: Array1::zeros(0),
            vt: Array2::zeros((0, n)),
        }
    }
}

/// Indices of the `k` largest eigenvalues above the rank-deficiency cutoff,
/// largest first
fn top_eigenpairs(eigvals: &Array1<f64>, k: usize) -> Vec<(usize, f64)> {
    let mut order: Vec<usize> = (0..eigvals.len()).collect();
    order.sort_by(|&a, &b| {
        eigvals[b]
            .partial_cmp(&eigvals[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let largest = eigvals.iter().cloned().fold(0.0f64, f64::max);
    if largest <= 0.0 {
        return Vec::new();
    }
    let cutoff = largest * RANK_EPS;

    order
        .into_iter()
        .take(k)
        .filter(|&i| eigvals[i] > cutoff)
        .map(|i| (i, eigvals[i]))
        .collect()
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and the matrix whose columns are the matching
/// orthonormal eigenvectors.
fn jacobi_eigen(mut g: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = g.nrows();
    let mut v: Array2<f64> = Array2::eye(n);
    if n < 2 {
        return (g.diag().to_owned(), v);
    }

    let scale = g.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += g[[p, q]] * g[[p, q]];
            }
        }
        if off.sqrt() <= OFF_DIAGONAL_TOL * scale {
            break;
        }

        for p in 0..(n - 1) {
            for q in (p + 1)..n {
                let gpq = g[[p, q]];
                if gpq.abs() <= OFF_DIAGONAL_TOL * scale {
                    continue;
                }

                let theta = (g[[q, q]] - g[[p, p]]) / (2.0 * gpq);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // G <- Jᵀ G J, rotating the (p, q) plane
                for i in 0..n {
                    let gip = g[[i, p]];
                    let giq = g[[i, q]];
                    g[[i, p]] = c * gip - s * giq;
                    g[[i, q]] = s * gip + c * giq;
                }
                for j in 0..n {
                    let gpj = g[[p, j]];
                    let gqj = g[[q, j]];
                    g[[p, j]] = c * gpj - s * gqj;
                    g[[q, j]] = s * gpj + c * gqj;
                }
                for i in 0..n {
                    let vip = v[[i, p]];
                    let viq = v[[i, q]];
                    v[[i, p]] = c * vip - s * viq;
                    v[[i, q]] = s * vip + c * viq;
                }
            }
        }
    }

    (g.diag().to_owned(), v)
}
