pub mod matchday_dtos;
