/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

//! Vectors serialize as a plain sequence. Matrices serialize as
//! `{ rows, cols, layout, data }`, with `data` in the stored order; they can
//! be read back into a matrix of either layout.

use crate::container::WritableMatrix;
use crate::expr::Shape;
use crate::expr::Dims;
use crate::layout::{Layout, StorageLayout};
use crate::matrix::Matrix;
use crate::storage::{MatrixStorage, VectorStorage};
use crate::vector::Vector;

use serde::{Serialize, Serializer, Deserialize, Deserializer};
use serde::de::Error as _;

impl<S> Serialize for Vector<S>
where
    S: VectorStorage,
    S::Elem: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    { serializer.collect_seq(self.iter()) }
}

impl<'de, S> Deserialize<'de> for Vector<S>
where
    S: VectorStorage,
    S::Elem: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<S::Elem>::deserialize(deserializer)?;

        let mut storage = S::new_default();
        storage.ensure_len(values.len()).map_err(D::Error::custom)?;
        for (dest, x) in storage.as_mut_slice().iter_mut().zip(values) {
            *dest = x;
        }
        Ok(Vector::from_storage(storage))
    }
}

#[derive(Serialize)]
struct MatrixRef<'a, X> {
    rows: usize,
    cols: usize,
    layout: Layout,
    data: &'a [X],
}

#[derive(Deserialize)]
struct MatrixOwned<X> {
    rows: usize,
    cols: usize,
    layout: Layout,
    data: Vec<X>,
}

impl<S, L> Serialize for Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Serialize,
    L: StorageLayout,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        MatrixRef {
            rows: self.rows(),
            cols: self.cols(),
            layout: self.layout(),
            data: self.as_slice(),
        }.serialize(serializer)
    }
}

impl<'de, S, L> Deserialize<'de> for Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Deserialize<'de> + Copy + Default,
    L: StorageLayout,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let MatrixOwned { rows, cols, layout, data } = MatrixOwned::deserialize(deserializer)?;
        let shape = Dims::new(rows, cols);
        if Some(data.len()) != rows.checked_mul(cols) {
            return Err(D::Error::custom(format_args!(
                "{} elements cannot fill a {}x{} matrix", data.len(), rows, cols,
            )));
        }

        let mut out = Matrix::<S, L>::new();
        out.ensure_shape(rows, cols).map_err(D::Error::custom)?;
        for (k, dest) in out.as_mut_slice().iter_mut().enumerate() {
            *dest = match layout == L::LAYOUT {
                true => data[k],
                false => data[shape.offset(shape.index_of(k, L::LAYOUT), layout)],
            };
        }
        Ok(out)
    }
}
