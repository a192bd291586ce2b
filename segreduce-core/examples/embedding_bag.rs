//! Embedding-bag pooling with sparse segment reductions.
//! Each bag averages (or sqrt-n normalizes) a variable number of rows of an
//! embedding table, then the upstream gradient is scattered back onto the table.

use segreduce_core::{from_vec_f32, from_vec_i32, from_vec_i64, ReductionConfig, ReductionMode, SegReduceError};

fn main() -> Result<(), SegReduceError> {
    println!("--- Embedding table (5 x 4) ---");
    let table = from_vec_f32((0..20).map(|x| x as f32 * 0.1).collect(), vec![5, 4])?;
    println!("{:?}", table);

    // Three bags: {0, 2}, {} (empty), {4, 4, 1}.
    let indices = from_vec_i64(vec![0, 2, 4, 4, 1], vec![5])?;
    let bags = from_vec_i32(vec![0, 0, 2, 2, 2], vec![5])?;

    let executor = ReductionConfig::default().with_num_threads(2).build()?;
    for mode in [ReductionMode::Sum, ReductionMode::Mean, ReductionMode::SqrtN] {
        let pooled = table.sparse_segment_reduce(&indices, &bags, mode, None, &executor)?;
        println!("{} pooled {:?}: {:?}", mode.name(), pooled.shape(), pooled.get_f32_data()?);
    }

    println!("--- Gradient of mean pooling ---");
    let upstream = from_vec_f32(vec![1.0; 12], vec![3, 4])?;
    let table_grad = upstream.sparse_segment_grad(&indices, &bags, ReductionMode::Mean, 5)?;
    println!("table grad {:?}: {:?}", table_grad.shape(), table_grad.get_f32_data()?);

    println!("--- Unsorted segment sum ---");
    let clicks = from_vec_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![5])?;
    let users = from_vec_i32(vec![2, 0, 2, -1, 1], vec![5])?;
    let per_user = clicks.unsorted_segment_sum(&users, 3)?;
    println!("per-user totals: {:?}", per_user.get_f32_data()?);

    Ok(())
}
