//! Offloading point multiplications.
//!
//! A [`Key`](crate::Key) with an attached [`Accelerator`] hands its
//! expensive multiplication to it and returns `Poll::Pending`. The caller
//! re-invokes the same operation until it completes; the key's
//! [`OperationState`](crate::OperationState) carries everything computed
//! before the hand-off.

use crate::{AffinePoint, Error, Result, SecretScalar, arithmetic::Curve};
use core::task::Poll;
use num_bigint::BigUint;
use std::sync::Arc;

/// A point multiplication handed to an accelerator.
#[derive(Debug)]
pub enum MulJob {
    /// `scalar·point`, where the scalar is secret.
    Mul {
        /// Curve to compute on.
        curve: Arc<Curve>,
        /// Secret multiplier.
        scalar: SecretScalar,
        /// Base point.
        point: AffinePoint,
    },
    /// `ka·a + kb·b` with public scalars.
    DualMul {
        /// Curve to compute on.
        curve: Arc<Curve>,
        /// First multiplier.
        ka: BigUint,
        /// First base point.
        a: AffinePoint,
        /// Second multiplier.
        kb: BigUint,
        /// Second base point.
        b: AffinePoint,
    },
}

impl MulJob {
    /// Computes the job in software.
    pub fn compute(&self) -> AffinePoint {
        match self {
            MulJob::Mul {
                curve,
                scalar,
                point,
            } => curve.to_affine(&curve.mul(scalar.expose(), point)),
            MulJob::DualMul {
                curve,
                ka,
                a,
                kb,
                b,
            } => curve.to_affine(&curve.dual_mul(ka, a, kb, b)),
        }
    }
}

/// Asynchronous point multiplication backend.
pub trait Accelerator: Send {
    /// Starts `job`. Fails with [`Error::BadState`] if a job is already in
    /// flight.
    fn submit(&mut self, job: MulJob) -> Result<()>;

    /// Checks for completion of the job in flight.
    ///
    /// Polling with no job in flight yields `Ready(Err(BadState))`.
    fn poll(&mut self) -> Poll<Result<AffinePoint>>;

    /// Abandons the job in flight, if any.
    fn cancel(&mut self);
}

/// Software accelerator that reports `Pending` a fixed number of times
/// before handing back each result.
#[derive(Debug, Default)]
pub struct DeferredAccelerator {
    delay: u32,
    in_flight: Option<(u32, AffinePoint)>,
    completed: u64,
}

impl DeferredAccelerator {
    /// Creates an accelerator that returns `Pending` `delay` times per job.
    pub fn new(delay: u32) -> Self {
        Self {
            delay,
            in_flight: None,
            completed: 0,
        }
    }

    /// Number of jobs whose result has been collected.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl Accelerator for DeferredAccelerator {
    fn submit(&mut self, job: MulJob) -> Result<()> {
        if self.in_flight.is_some() {
            return Err(Error::BadState);
        }
        self.in_flight = Some((self.delay, job.compute()));
        Ok(())
    }

    fn poll(&mut self) -> Poll<Result<AffinePoint>> {
        match self.in_flight.take() {
            None => Poll::Ready(Err(Error::BadState)),
            Some((0, point)) => {
                self.completed += 1;
                Poll::Ready(Ok(point))
            }
            Some((remaining, point)) => {
                self.in_flight = Some((remaining - 1, point));
                Poll::Pending
            }
        }
    }

    fn cancel(&mut self) {
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveCache, CurveId};

    #[test]
    fn reports_pending_then_ready() {
        let curve = CurveCache::new().curve(CurveId::Secp256r1).unwrap();
        let mut acc = DeferredAccelerator::new(2);
        assert_eq!(acc.poll(), Poll::Ready(Err(Error::BadState)));

        let job = MulJob::Mul {
            curve: curve.clone(),
            scalar: SecretScalar::new(BigUint::from(1u32)),
            point: curve.generator().clone(),
        };
        acc.submit(job).unwrap();
        let again = MulJob::DualMul {
            curve: curve.clone(),
            ka: BigUint::from(1u32),
            a: curve.generator().clone(),
            kb: BigUint::from(1u32),
            b: curve.generator().clone(),
        };
        assert_eq!(acc.submit(again).unwrap_err(), Error::BadState);

        assert!(acc.poll().is_pending());
        assert!(acc.poll().is_pending());
        assert_eq!(acc.poll(), Poll::Ready(Ok(curve.generator().clone())));
        assert_eq!(acc.completed(), 1);

        let job = MulJob::Mul {
            curve: curve.clone(),
            scalar: SecretScalar::new(BigUint::from(2u32)),
            point: curve.generator().clone(),
        };
        acc.submit(job).unwrap();
        acc.cancel();
        assert_eq!(acc.poll(), Poll::Ready(Err(Error::BadState)));
    }
}
