//! The bwt_algorithms module forms the sorting subsystem of combyte.
//!
//! combyte uses the Burrow-Wheeler Transform (BWT) to prepare data for compression. This transform alters the data in such
//! a way that runs of similar bytes are more likely to occur. This allows for more effective run length coding.
//!
//! The forward transform requires "computationally expensive" sorting. Since different sorting algorithms are better
//! suited for different kinds of data, this module contains two of them: a direct comparison sort and a prefix
//! doubling sort. Both order identical rotations by their starting offset and produce the same output.
//!
pub mod bwt_sort;
