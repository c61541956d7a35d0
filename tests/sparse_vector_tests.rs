use std::collections::{BTreeMap, HashMap};

use bytes::{BufMut, Bytes};
use pgvec::{
    ByteOrder, ColumnValue, CooMatrix, CsrMatrix, DType, DokMatrix, Error, Field, Input,
    NumericArray, Param, SparseVector,
};

fn pack(dim: i32, indices: &[i32], values: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.put_i32(dim);
    out.put_i32(i32::try_from(indices.len()).unwrap());
    out.put_i32(0);
    for &i in indices {
        out.put_i32(i);
    }
    for &v in values {
        out.put_f32(v);
    }
    out
}

fn example() -> SparseVector {
    SparseVector::new(vec![1i32, 0, 2, 0, 3, 0], None).unwrap()
}

#[test]
fn test_list() {
    let vec = example();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.to_array().to_f32_vec(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_list_dimensions() {
    let err = SparseVector::new(vec![1i32, 0, 2, 0, 3, 0], Some(6)).unwrap_err();
    assert_eq!(err.to_string(), "extra argument");
}

#[test]
fn test_array() {
    let mut data = Vec::new();
    for v in [1i64, 0, 2, 0, 3, 0] {
        data.put_i64_le(v);
    }
    let arr = NumericArray::vector(DType::I64(ByteOrder::Little), data).unwrap();
    let vec = SparseVector::new(arr, None).unwrap();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_map() {
    let map = BTreeMap::from([(2usize, 2.0f32), (4, 3.0), (0, 1.0), (3, 0.0)]);
    let vec = SparseVector::new(map, Some(6)).unwrap();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_hash_map() {
    let map = HashMap::from([(4usize, 3.0f32), (0, 1.0), (2, 2.0)]);
    assert_eq!(SparseVector::new(map, Some(6)).unwrap(), example());
}

#[test]
fn test_map_no_dimensions() {
    let map = BTreeMap::from([(0usize, 1.0f32), (2, 2.0), (4, 3.0)]);
    let err = SparseVector::new(map, None).unwrap_err();
    assert_eq!(err, Error::MissingDimension);
    assert_eq!(err.to_string(), "missing dimensions");
}

#[test]
fn test_map_out_of_bounds() {
    let map = BTreeMap::from([(6usize, 1.0f32)]);
    assert!(matches!(SparseVector::new(map, Some(6)), Err(Error::Shape(_))));
}

#[test]
fn test_coo_matrix() {
    let coo = CooMatrix::from_row(&[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    let vec = SparseVector::new(coo, None).unwrap();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_coo_matrix_dimensions() {
    let coo = CooMatrix::from_row(&[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    let err = SparseVector::new(coo, Some(6)).unwrap_err();
    assert_eq!(err.to_string(), "extra argument");
}

#[test]
fn test_coo_matrix_duplicates_summed() {
    let coo = CooMatrix::new((1, 4), vec![0, 0, 0], vec![3, 1, 3], vec![1.0, 2.0, 0.5]).unwrap();
    let vec = SparseVector::new(coo, None).unwrap();
    assert_eq!(vec.indices(), &[1, 3]);
    assert_eq!(vec.values(), &[2.0, 1.5]);
}

#[test]
fn test_coo_matrix_explicit_zero_dropped() {
    let coo = CooMatrix::new((1, 3), vec![0, 0], vec![0, 2], vec![0.0, 4.0]).unwrap();
    let vec = SparseVector::new(coo, None).unwrap();
    assert_eq!(vec.indices(), &[2]);
}

#[test]
fn test_dok_matrix() {
    let dok = DokMatrix::new((1, 6), [((0, 4), 3.0), ((0, 0), 1.0), ((0, 2), 2.0)]).unwrap();
    let vec = SparseVector::new(dok, None).unwrap();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_csr_matrix() {
    let csr = CsrMatrix::new((1, 6), vec![0, 3], vec![0, 2, 4], vec![1.0, 2.0, 3.0]).unwrap();
    let vec = SparseVector::new(csr, None).unwrap();
    assert_eq!(vec.to_list(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.indices(), &[0, 2, 4]);
}

#[test]
fn test_matrix_with_two_rows() {
    let csr = CsrMatrix::new((2, 2), vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0]).unwrap();
    let err = SparseVector::new(csr, None).unwrap_err();
    assert_eq!(err.to_string(), "expected ndim to be 1");
}

#[test]
fn test_ndim_two() {
    let err = SparseVector::new(vec![vec![1i32, 0], vec![0, 1]], None).unwrap_err();
    assert_eq!(err.to_string(), "expected ndim to be 1");
}

#[test]
fn test_display() {
    assert_eq!(example().to_string(), "SparseVector({0: 1.0, 2: 2.0, 4: 3.0}, 6)");
    assert_eq!(format!("{:?}", example()), "SparseVector({0: 1.0, 2: 2.0, 4: 3.0}, 6)");
}

#[test]
fn test_equality() {
    assert_eq!(example(), example());
    assert_ne!(example(), SparseVector::new(vec![1i32, 0, 2, 0, 3, 1], None).unwrap());
    let map = BTreeMap::from([(2usize, 2.0f32), (4, 3.0), (0, 1.0), (3, 0.0)]);
    assert_eq!(example(), SparseVector::new(map, Some(6)).unwrap());
    assert_ne!(
        SparseVector::from_map([], 1).unwrap(),
        SparseVector::from_map([], 2).unwrap()
    );
}

#[test]
fn test_dimensions() {
    assert_eq!(example().dimensions(), 6);
}

#[test]
fn test_indices() {
    assert_eq!(example().indices(), &[0, 2, 4]);
}

#[test]
fn test_values() {
    assert_eq!(example().values(), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_to_coo() {
    let coo = example().to_coo();
    assert_eq!(coo.to_dense(), vec![vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]]);
    assert_eq!(SparseVector::new(coo, None).unwrap(), example());
}

#[test]
fn test_zero_vector_text() {
    let vec = SparseVector::from_map([], 3).unwrap();
    assert_eq!(vec.to_text(), "{}/3");
    assert_eq!(SparseVector::from_text(&vec.to_text()).unwrap().to_list(), vec.to_list());
}

#[test]
fn test_from_text() {
    let vec = SparseVector::from_text("{1:1.5,3:2,5:3}/6").unwrap();
    assert_eq!(vec.dimensions(), 6);
    assert_eq!(vec.indices(), &[0, 2, 4]);
    assert_eq!(vec.values(), &[1.5, 2.0, 3.0]);
    assert_eq!(vec.to_list(), vec![1.5, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.to_array().to_f32_vec(), vec![1.5, 0.0, 2.0, 0.0, 3.0, 0.0]);
}

#[test]
fn test_from_binary() {
    let data = pack(6, &[0, 2, 4], &[1.5, 2.0, 3.0]);
    let vec = SparseVector::from_binary(&data).unwrap();
    assert_eq!(vec.dimensions(), 6);
    assert_eq!(vec.indices(), &[0, 2, 4]);
    assert_eq!(vec.values(), &[1.5, 2.0, 3.0]);
    assert_eq!(vec.to_list(), vec![1.5, 0.0, 2.0, 0.0, 3.0, 0.0]);
    assert_eq!(vec.to_binary(), data);
}

#[test]
fn test_from_binary_ignores_reserved_field() {
    let mut data = pack(3, &[1], &[2.0]);
    data[11] = 7;
    assert_eq!(SparseVector::from_binary(&data).unwrap().to_list(), vec![0.0, 2.0, 0.0]);
}

#[test]
fn test_from_binary_rejects_unsorted_indices() {
    let data = pack(6, &[2, 0], &[1.0, 2.0]);
    assert!(matches!(SparseVector::from_binary(&data), Err(Error::Format(_))));
    let data = pack(6, &[6], &[1.0]);
    assert!(matches!(SparseVector::from_binary(&data), Err(Error::Format(_))));
}

#[test]
fn test_to_text() {
    assert_eq!(example().to_text(), "{1:1.0,3:2.0,5:3.0}/6");
}

#[test]
fn test_to_db_none() {
    assert_eq!(SparseVector::to_db(None, None).unwrap(), None);
}

#[test]
fn test_to_db_vector() {
    assert_eq!(
        SparseVector::to_db(Some(Param::Value(example())), None).unwrap().as_deref(),
        Some("{1:1.0,3:2.0,5:3.0}/6")
    );
}

#[test]
fn test_to_db_list() {
    let input = <Input as From<Vec<i32>>>::from(vec![1i32, 0, 2, 0, 3, 0]);
    assert_eq!(
        SparseVector::to_db(Some(Param::Input(input)), None).unwrap().as_deref(),
        Some("{1:1.0,3:2.0,5:3.0}/6")
    );
}

#[test]
fn test_to_db_with_dim() {
    let input = <Input as From<Vec<i32>>>::from(vec![1i32, 0, 2, 0, 3, 0]);
    assert_eq!(
        SparseVector::to_db(Some(Param::Input(input)), Some(6)).unwrap().as_deref(),
        Some("{1:1.0,3:2.0,5:3.0}/6")
    );
}

#[test]
fn test_to_db_wrong_dim() {
    let input = <Input as From<Vec<i32>>>::from(vec![1i32, 0, 2, 0, 3]);
    let err = SparseVector::to_db(Some(Param::Input(input)), Some(6)).unwrap_err();
    assert_eq!(err.to_string(), "expected 6 dimensions, not 5");
}

#[test]
fn test_to_db_binary_none() {
    assert_eq!(SparseVector::to_db_binary(None, None).unwrap(), None);
}

#[test]
fn test_to_db_binary_vector() {
    let result = SparseVector::to_db_binary(Some(Param::Value(example())), None).unwrap();
    assert_eq!(result, Some(pack(6, &[0, 2, 4], &[1.0, 2.0, 3.0])));
}

#[test]
fn test_to_db_binary_list() {
    let input = <Input as From<Vec<i32>>>::from(vec![1i32, 0, 2, 0, 3, 0]);
    let result = SparseVector::to_db_binary(Some(Param::Input(input)), None).unwrap();
    assert_eq!(result, Some(pack(6, &[0, 2, 4], &[1.0, 2.0, 3.0])));
}

#[test]
fn test_from_db_none() {
    assert_eq!(SparseVector::from_db(None).unwrap(), None);
}

#[test]
fn test_from_db_sparsevector() {
    let result = SparseVector::from_db(Some(Field::Value(example()))).unwrap();
    assert_eq!(result, Some(example()));
}

#[test]
fn test_from_db_text() {
    let result = SparseVector::from_db(Some(Field::Text("{1:1.5,3:2,5:3}/6".to_string())))
        .unwrap()
        .unwrap();
    assert_eq!(result.to_list(), vec![1.5, 0.0, 2.0, 0.0, 3.0, 0.0]);
}

#[test]
fn test_from_db_binary_none() {
    assert_eq!(SparseVector::from_db_binary(None).unwrap(), None);
}

#[test]
fn test_from_db_binary_sparsevector() {
    let result = SparseVector::from_db_binary(Some(Field::Value(example()))).unwrap();
    assert_eq!(result, Some(example()));
}

#[test]
fn test_from_db_binary_bytes() {
    let data = Bytes::from(pack(6, &[0, 2, 4], &[1.5, 2.0, 3.0]));
    let result = SparseVector::from_db_binary(Some(Field::Binary(data))).unwrap().unwrap();
    assert_eq!(result.to_list(), vec![1.5, 0.0, 2.0, 0.0, 3.0, 0.0]);
}

#[test]
fn test_empty_sparse_vector() {
    let vec = SparseVector::from_map([], 5).unwrap();
    assert_eq!(vec.dimensions(), 5);
    assert!(vec.indices().is_empty());
    assert!(vec.values().is_empty());
    assert_eq!(vec.to_list(), vec![0.0; 5]);
}

#[test]
fn test_single_nonzero() {
    let vec = SparseVector::new(BTreeMap::from([(3usize, 42.0f32)]), Some(10)).unwrap();
    assert_eq!(vec.dimensions(), 10);
    assert_eq!(vec.indices(), &[3]);
    assert_eq!(vec.values(), &[42.0]);
}

#[test]
fn test_negative_values() {
    let vec = SparseVector::new(vec![-1i32, 0, -2, 0, -3], None).unwrap();
    assert_eq!(vec.values(), &[-1.0, -2.0, -3.0]);
    assert_eq!(vec.to_list(), vec![-1.0, 0.0, -2.0, 0.0, -3.0]);
}

#[test]
fn test_roundtrip_text() {
    let original = SparseVector::new(vec![1.5f64, 0.0, 2.5, 0.0, 3.5, 0.0], None).unwrap();
    assert_eq!(SparseVector::from_text(&original.to_text()).unwrap(), original);
}

#[test]
fn test_roundtrip_binary() {
    let original = SparseVector::new(vec![1.5f64, 0.0, 2.5, 0.0, 3.5, 0.0], None).unwrap();
    assert_eq!(SparseVector::from_binary(&original.to_binary()).unwrap(), original);
}
