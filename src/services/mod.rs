// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Query and aggregation over the store. Each service borrows the
//! connection it is handed and owns no state of its own.

pub mod todos;
pub mod transactions;

pub use todos::{NewTodo, TodoFilter, TodoService};
pub use transactions::{NewTransaction, TransactionFilter, TransactionService};
