mod row_mapper_tests;
