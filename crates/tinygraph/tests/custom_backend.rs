// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tests the binding against a hand-rolled backend.
//!
//! The stub proves two things: the binding works over any engine that
//! satisfies the `backend` traits, and engine failures injected at
//! arbitrary points surface as the right error without wedging the
//! interpreter.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tinygraph::backend::{Backend, BackendModel, BackendSession};
use tinygraph::{DType, Error, Interpreter, Model, Shape, Stage, TensorInfo, Value};

/// An engine that sums its two-element input into a one-element output.
struct StubBackend {
    /// When set, the first `invoke` per session fails.
    fail_first_invoke: bool,
}

struct StubModel {
    fail_first_invoke: bool,
}

struct StubSession {
    allocated: bool,
    must_fail: bool,
    input: Vec<u8>,
    output: Vec<u8>,
}

static LOAD_WITNESS: AtomicBool = AtomicBool::new(false);

impl Backend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn load_file(&self, _path: &Path) -> Result<Arc<dyn BackendModel>, Error> {
        Err(Error::ModelLoad {
            detail: "stub backend has no file loader".into(),
        })
    }

    fn load_bytes(&self, bytes: Vec<u8>) -> Result<Arc<dyn BackendModel>, Error> {
        if bytes != b"stub" {
            return Err(Error::ModelLoad {
                detail: "not a stub model".into(),
            });
        }
        LOAD_WITNESS.store(true, Ordering::SeqCst);
        Ok(Arc::new(StubModel {
            fail_first_invoke: self.fail_first_invoke,
        }))
    }
}

impl BackendModel for StubModel {
    fn description(&self) -> String {
        "stub sum".into()
    }

    fn input_specs(&self) -> Vec<TensorInfo> {
        vec![TensorInfo::new("a", DType::F32, Shape::vector(2))]
    }

    fn output_specs(&self) -> Vec<TensorInfo> {
        vec![TensorInfo::new("sum", DType::F32, Shape::vector(1))]
    }

    fn new_session(
        &self,
        _options: &tinygraph::InterpreterOptions,
    ) -> Result<Box<dyn BackendSession>, Error> {
        Ok(Box::new(StubSession {
            allocated: false,
            must_fail: self.fail_first_invoke,
            input: Vec::new(),
            output: Vec::new(),
        }))
    }
}

impl BackendSession for StubSession {
    fn allocate(&mut self) -> Result<(), Error> {
        if !self.allocated {
            self.input = vec![0; 8];
            self.output = vec![0; 4];
            self.allocated = true;
        }
        Ok(())
    }

    fn invoke(&mut self) -> Result<(), Error> {
        if self.must_fail {
            self.must_fail = false;
            return Err(Error::Backend {
                detail: "injected invoke failure".into(),
            });
        }
        let a = f32::from_ne_bytes([self.input[0], self.input[1], self.input[2], self.input[3]]);
        let b = f32::from_ne_bytes([self.input[4], self.input[5], self.input[6], self.input[7]]);
        self.output.copy_from_slice(&(a + b).to_ne_bytes());
        Ok(())
    }

    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn input_info(&self, index: usize) -> Option<TensorInfo> {
        (index == 0).then(|| TensorInfo::new("a", DType::F32, Shape::vector(2)))
    }

    fn output_info(&self, index: usize) -> Option<TensorInfo> {
        (index == 0).then(|| TensorInfo::new("sum", DType::F32, Shape::vector(1)))
    }

    fn input_bytes(&self, index: usize) -> Option<&[u8]> {
        (self.allocated && index == 0).then_some(self.input.as_slice())
    }

    fn output_bytes(&self, index: usize) -> Option<&[u8]> {
        (self.allocated && index == 0).then_some(self.output.as_slice())
    }

    fn input_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if self.allocated && index == 0 {
            Some(self.input.as_mut_slice())
        } else {
            None
        }
    }

    fn output_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if self.allocated && index == 0 {
            Some(self.output.as_mut_slice())
        } else {
            None
        }
    }
}

#[test]
fn test_binding_runs_over_a_foreign_backend() {
    let backend = StubBackend {
        fail_first_invoke: false,
    };
    let model = Model::from_bytes_with(b"stub".to_vec(), &backend).unwrap();
    assert!(LOAD_WITNESS.load(Ordering::SeqCst));
    assert_eq!(model.description(), "stub sum");

    let mut interp = Interpreter::new(&model).unwrap();
    interp.allocate_tensors().unwrap();
    interp
        .input_tensor_mut(0)
        .unwrap()
        .set_data(&[Value::Float(1.5), Value::Float(2.25)])
        .unwrap();
    interp.invoke().unwrap();

    assert_eq!(
        interp.output_tensor(0).unwrap().data(),
        vec![Value::Float(3.75)]
    );
}

#[test]
fn test_injected_invoke_failure_does_not_wedge_the_interpreter() {
    let backend = StubBackend {
        fail_first_invoke: true,
    };
    let model = Model::from_bytes_with(b"stub".to_vec(), &backend).unwrap();
    let mut interp = Interpreter::new(&model).unwrap();
    interp.allocate_tensors().unwrap();
    interp
        .input_tensor_mut(0)
        .unwrap()
        .set_data(&[Value::Float(1.0), Value::Float(1.0)])
        .unwrap();

    let err = interp.invoke().unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
    assert_eq!(interp.stage(), Stage::Allocated);
    assert_eq!(interp.stats().invocations, 0);

    // The injected fault cleared; the same interpreter finishes the job.
    interp.invoke().unwrap();
    assert_eq!(interp.stage(), Stage::Invoked);
    assert_eq!(
        interp.output_tensor(0).unwrap().data(),
        vec![Value::Float(2.0)]
    );
}

#[test]
fn test_rejected_stub_bytes() {
    let backend = StubBackend {
        fail_first_invoke: false,
    };
    let err = Model::from_bytes_with(vec![1, 2, 3], &backend).unwrap_err();
    assert!(matches!(err, Error::ModelLoad { .. }));
}
